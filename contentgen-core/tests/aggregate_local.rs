use std::fs::{self, create_dir_all, File};
use std::io::Write;

use contentgen_core::aggregate::{code_fence, DirectoryAggregator};
use contentgen_core::config::{AggregateConfig, GeneratorConfig};
use contentgen_core::contract::{GenerationRequest, LocalAggregator, MockRemoteAcquirer};
use contentgen_core::metrics::Cl100kEncoder;
use contentgen_core::ContentGenerator;
use tempfile::tempdir;

#[test]
fn aggregates_nested_files_in_sorted_order() {
    let tmp = tempdir().unwrap();
    let repo_path = tmp.path().join("project");
    create_dir_all(repo_path.join("src/module")).unwrap();
    {
        let mut f = File::create(repo_path.join("root.txt")).unwrap();
        writeln!(f, "hello root").unwrap();
        let mut f = File::create(repo_path.join("src/module/nested.rs")).unwrap();
        write!(f, "fn nested() {{}}").unwrap();
        let mut f = File::create(repo_path.join("src/a.rs")).unwrap();
        writeln!(f, "fn a() {{}}").unwrap();
    }

    let out = tmp.path().join("out");
    let aggregator = DirectoryAggregator::new(&out, AggregateConfig::default());
    let summary = aggregator.aggregate(&repo_path, "project").unwrap();

    assert_eq!(summary.output_path, out.join("project.md"));
    assert_eq!(summary.files_included, 3);
    assert_eq!(summary.files_skipped, 0);

    let doc = fs::read_to_string(&summary.output_path).unwrap();
    assert!(doc.starts_with("# project\n\n"));
    assert!(doc.contains("## root.txt\n\n```txt\nhello root\n```\n"));
    assert!(doc.contains("## src/module/nested.rs\n\n```rs\nfn nested() {}\n```\n"));

    let root_at = doc.find("## root.txt").unwrap();
    let a_at = doc.find("## src/a.rs").unwrap();
    let nested_at = doc.find("## src/module/nested.rs").unwrap();
    assert!(root_at < a_at && a_at < nested_at, "unexpected order:\n{doc}");
}

#[test]
fn skips_excluded_dirs_oversized_and_binary_files() {
    let tmp = tempdir().unwrap();
    let repo_path = tmp.path();

    fs::write(repo_path.join("keepme.txt"), "should be present").unwrap();
    create_dir_all(repo_path.join(".git/info")).unwrap();
    create_dir_all(repo_path.join("target/deep")).unwrap();
    create_dir_all(repo_path.join("node_modules/pkg")).unwrap();
    fs::write(repo_path.join(".git/info/config"), "git internals").unwrap();
    fs::write(repo_path.join("target/deep/temp.obj"), "object").unwrap();
    fs::write(repo_path.join("node_modules/pkg/index.js"), "vendored").unwrap();
    fs::write(repo_path.join("logo.png"), [0x89u8, 0x50, 0x4e, 0x47, 0xff, 0xfe]).unwrap();
    fs::write(repo_path.join("big.log"), "x".repeat(64)).unwrap();

    let config = AggregateConfig {
        max_file_bytes: 32,
        ..AggregateConfig::default()
    };
    let out = tempdir().unwrap();
    let aggregator = DirectoryAggregator::new(out.path(), config);
    let summary = aggregator.aggregate(repo_path, "repo").unwrap();

    assert_eq!(summary.files_included, 1);
    assert_eq!(summary.files_skipped, 2);

    let doc = fs::read_to_string(summary.output_path).unwrap();
    assert!(doc.contains("## keepme.txt"));
    for absent in ["git internals", "object", "vendored", "logo.png", "big.log"] {
        assert!(!doc.contains(absent), "document should not contain {absent}");
    }
}

#[test]
fn output_dir_inside_tree_is_not_aggregated() {
    let tmp = tempdir().unwrap();
    let repo_path = tmp.path();
    fs::write(repo_path.join("main.rs"), "fn main() {}").unwrap();
    let out = repo_path.join("generated");
    create_dir_all(&out).unwrap();
    fs::write(out.join("stale.md"), "stale document").unwrap();

    let aggregator = DirectoryAggregator::new(&out, AggregateConfig::default());
    let summary = aggregator.aggregate(repo_path, "self").unwrap();
    assert_eq!(summary.files_included, 1);

    let doc = fs::read_to_string(summary.output_path).unwrap();
    assert!(!doc.contains("stale document"));
}

#[test]
fn single_file_path_is_aggregated_alone() {
    let tmp = tempdir().unwrap();
    let file = tmp.path().join("notes.md");
    fs::write(&file, "just notes\n").unwrap();

    let out = tempdir().unwrap();
    let aggregator = DirectoryAggregator::new(out.path(), AggregateConfig::default());
    let summary = aggregator.aggregate(&file, "notes.md").unwrap();

    assert_eq!(summary.output_path, out.path().join("notes.md.md"));
    let doc = fs::read_to_string(summary.output_path).unwrap();
    assert!(doc.contains("## notes.md\n\n```md\njust notes\n```"));
}

#[tokio::test]
async fn missing_path_is_an_acquisition_error() {
    let out = tempdir().unwrap();
    let aggregator = DirectoryAggregator::new(out.path(), AggregateConfig::default());
    let err = aggregator
        .aggregate_local("/definitely/not/here", "here")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("/definitely/not/here"));
    assert!(!out.path().join("here.md").exists());
}

#[tokio::test]
async fn generator_with_directory_aggregator_end_to_end() {
    let tmp = tempdir().unwrap();
    let project = tmp.path().join("demo");
    create_dir_all(project.join("src")).unwrap();
    fs::write(project.join("src/lib.rs"), "pub fn answer() -> u32 { 42 }\n").unwrap();

    let out = tmp.path().join("output");
    let generator = ContentGenerator::new(
        GeneratorConfig {
            output_dir: out.clone(),
        },
        MockRemoteAcquirer::new(),
        DirectoryAggregator::new(&out, AggregateConfig::default()),
        Cl100kEncoder::new().expect("cl100k_base should load"),
    );

    let local = format!("{}/", project.display());
    let response = generator
        .generate(&GenerationRequest::local(local))
        .await
        .expect("generation should succeed");

    assert!(response.content.starts_with("# demo\n"));
    assert!(response.content.contains("pub fn answer()"));
    assert!(response.token_count > 0);
    assert_eq!(
        response.byte_size_label,
        format!("{} B", response.content.len())
    );
    assert!(out.join("demo.md").exists());
}

#[cfg(unix)]
#[test]
fn symlinked_directories_are_not_followed() {
    use std::os::unix::fs::symlink;

    let tmp = tempdir().unwrap();
    let repo_path = tmp.path().join("looped");
    create_dir_all(repo_path.join("sub")).unwrap();
    fs::write(repo_path.join("main.rs"), "fn main() {}\n").unwrap();
    symlink("..", repo_path.join("sub/loop")).unwrap();
    symlink(".", repo_path.join("a")).unwrap();
    symlink(".", repo_path.join("b")).unwrap();

    let out = tmp.path().join("out");
    let aggregator = DirectoryAggregator::new(&out, AggregateConfig::default());
    let summary = aggregator.aggregate(&repo_path, "looped").unwrap();

    assert_eq!(summary.files_included, 1);
    assert_eq!(summary.files_skipped, 3);
    let doc = fs::read_to_string(summary.output_path).unwrap();
    assert_eq!(doc.matches("fn main() {}").count(), 1, "document:\n{doc}");
}

#[test]
fn fence_outgrows_backticks_inside_the_file() {
    let tmp = tempdir().unwrap();
    let repo_path = tmp.path().join("docs");
    create_dir_all(&repo_path).unwrap();
    fs::write(
        repo_path.join("README.md"),
        "# usage\n\n```rust\nfn demo() {}\n```\n",
    )
    .unwrap();
    fs::write(repo_path.join("z.rs"), "fn z() {}\n").unwrap();

    let out = tmp.path().join("out");
    let aggregator = DirectoryAggregator::new(&out, AggregateConfig::default());
    let summary = aggregator.aggregate(&repo_path, "docs").unwrap();

    let doc = fs::read_to_string(summary.output_path).unwrap();
    assert!(doc.contains("## README.md\n\n````md\n# usage\n\n```rust\nfn demo() {}\n```\n````\n\n"));
    assert!(doc.contains("## z.rs\n\n```rs\nfn z() {}\n```\n\n"));
}

#[test]
fn code_fence_lengths() {
    let cases = [
        ("plain text", "```"),
        ("inline `code` and ``double``", "```"),
        ("```rust\n```", "````"),
        ("`````", "``````"),
    ];
    for (text, expected) in cases {
        assert_eq!(code_fence(text), expected, "text: {text:?}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_local_requests_each_get_their_own_document() {
    let tmp = tempdir().unwrap();
    let first = tmp.path().join("first");
    let second = tmp.path().join("second");
    create_dir_all(&first).unwrap();
    create_dir_all(&second).unwrap();
    fs::write(first.join("one.rs"), "fn one() {}\n").unwrap();
    fs::write(second.join("two.rs"), "fn two() {}\n").unwrap();

    let out = tmp.path().join("output");
    let generator = ContentGenerator::new(
        GeneratorConfig {
            output_dir: out.clone(),
        },
        MockRemoteAcquirer::new(),
        DirectoryAggregator::new(&out, AggregateConfig::default()),
        Cl100kEncoder::new().expect("cl100k_base should load"),
    );

    let first_request = GenerationRequest::local(first.display().to_string());
    let second_request = GenerationRequest::local(second.display().to_string());
    let (a, b) = tokio::join!(
        generator.generate(&first_request),
        generator.generate(&second_request)
    );

    let a = a.expect("first generation should succeed");
    let b = b.expect("second generation should succeed");
    assert!(a.content.starts_with("# first\n") && a.content.contains("fn one()"));
    assert!(b.content.starts_with("# second\n") && b.content.contains("fn two()"));
    assert!(!a.content.contains("fn two()"));
}
