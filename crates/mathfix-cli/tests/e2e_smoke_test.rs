use std::{fs, path::Path};

use tempfile::tempdir;

use miette::Diagnostic as _;

use mathfix::MathfixError;
use mathfix_cli::{Args, ConfigSource, run};

fn args(input: &Path, output: Option<&Path>, config: Option<&Path>) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: output.map(|path| path.to_string_lossy().to_string()),
        config: config.map(|path| path.to_string_lossy().to_string()),
        log_level: "off".to_string(),
    }
}

/// Lays out a small book: a preamble defining macros, a chapter using them
/// and an appendix with its own definitions.
fn write_book(root: &Path) {
    fs::write(
        root.join("00-preamble.md"),
        "# Notation\n\n$\\newcommand{\\R}{\\mathbb{R}}\\newcommand{\\norm}[1]{\\lVert #1 \\rVert}$\n",
    )
    .unwrap();
    fs::write(
        root.join("01-vectors.md"),
        "For $ v \\in \\R^n $ the length is $\\norm{v}$.\n\n$$ \\begin{align} \\norm{v}^2 &= v \\cdot v \\end{align} $$\n",
    )
    .unwrap();
    fs::write(root.join("notes.rst"), "Not content: $ x $\n").unwrap();

    let appendix = root.join("appendix");
    fs::create_dir(&appendix).unwrap();
    fs::write(
        appendix.join("a.md"),
        "$\\newcommand{\\R}{\\mathcal{R}}$ A ring $\\R$.\n",
    )
    .unwrap();
}

#[test]
fn e2e_smoke_test_directory_to_output() {
    let input = tempdir().expect("Failed to create temp directory");
    let output = tempdir().expect("Failed to create temp directory");
    write_book(input.path());

    run(&args(input.path(), Some(output.path()), None)).expect("Fixing failed");

    let vectors = fs::read_to_string(output.path().join("01-vectors.md")).unwrap();
    assert_eq!(
        vectors,
        "For $v \\in \\mathbb{R}^n$ the length is $\\lVert v \\rVert$.\n\n$$\n\\begin{aligned} \\lVert v \\rVert^2 &= v \\cdot v \\end{aligned}\n$$\n"
    );

    let preamble = fs::read_to_string(output.path().join("00-preamble.md")).unwrap();
    assert_eq!(preamble, "# Notation\n\n$$\n");

    let appendix = fs::read_to_string(output.path().join("appendix").join("a.md")).unwrap();
    assert_eq!(appendix, "$$ A ring $\\mathcal{R}$.\n");

    // Only configured extensions are content
    assert!(!output.path().join("notes.rst").exists());

    // The input is left alone
    let original = fs::read_to_string(input.path().join("01-vectors.md")).unwrap();
    assert!(original.contains("\\norm{v}"));
}

#[test]
fn e2e_smoke_test_in_place() {
    let dir = tempdir().expect("Failed to create temp directory");
    let file = dir.path().join("page.md");
    fs::write(&file, "Sum $ \\sum_{i} a_i $ here.\n").unwrap();
    let untouched = dir.path().join("plain.md");
    fs::write(&untouched, "No math.\n").unwrap();

    run(&args(dir.path(), None, None)).expect("Fixing failed");

    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        "Sum $\\sum_{i} a_i$ here.\n"
    );
    assert_eq!(fs::read_to_string(&untouched).unwrap(), "No math.\n");
}

#[test]
fn e2e_smoke_test_single_file_with_config() {
    let dir = tempdir().expect("Failed to create temp directory");
    let input = dir.path().join("in.txt");
    let output = dir.path().join("out").join("fixed.txt");
    let config = dir.path().join("config.toml");
    fs::write(&input, "$$ \\begin{eqnarray} x \\end{eqnarray} $$").unwrap();
    fs::write(
        &config,
        "[fixes]\npad_blocks = false\n\n[fixes.rename]\neqnarray = \"array\"\n",
    )
    .unwrap();

    run(&args(&input, Some(&output), Some(&config))).expect("Fixing failed");

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "$$\\begin{array} x \\end{array}$$"
    );
}

#[test]
fn e2e_smoke_test_error_examples() {
    let cases = [
        ("mismatched.md", "Broken $$x$ math"),
        ("unbalanced.md", "Broken $ {x $ math"),
        ("arity.md", "$\\newcommand{\\t}[1]{#1}\\t$"),
        ("unclosed_block.md", "$\\begin{cases} x$"),
    ];

    for (name, text) in cases {
        let dir = tempdir().expect("Failed to create temp directory");
        let file = dir.path().join(name);
        fs::write(&file, text).unwrap();

        let err = run(&args(&file, None, None)).expect_err(name);
        assert!(
            matches!(&err, MathfixError::Fix { path, .. } if path == &file),
            "{name}: unexpected error {err}"
        );

        // Nothing is written on failure
        assert_eq!(fs::read_to_string(&file).unwrap(), text);
    }
}

#[test]
fn e2e_smoke_test_skip_policy() {
    let dir = tempdir().expect("Failed to create temp directory");
    let file = dir.path().join("page.md");
    let config = dir.path().join("config.toml");
    fs::write(&file, "$ {x $ and $ y $").unwrap();
    fs::write(&config, "[content]\non_error = \"skip\"\n").unwrap();

    let report = run(&args(&file, None, Some(&config))).expect("Fixing failed");

    assert_eq!(fs::read_to_string(&file).unwrap(), "$ {x $ and $y$");
    assert_eq!(report.config_source(), &ConfigSource::Explicit(config));
    assert_eq!(report.written(), &[file.clone()]);
    assert_eq!(report.skipped_count(), 1);

    let warnings = report.warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].severity(), Some(miette::Severity::Warning));
}

#[test]
fn e2e_smoke_test_report_counts_written_files() {
    let input = tempdir().expect("Failed to create temp directory");
    let output = tempdir().expect("Failed to create temp directory");
    write_book(input.path());

    let report = run(&args(input.path(), Some(output.path()), None)).expect("Fixing failed");

    // Every content file is mirrored, changed or not
    assert_eq!(report.files().len(), 3);
    assert_eq!(report.written().len(), 3);
    assert_eq!(report.skipped_count(), 0);
    assert!(report.warnings().is_empty());
}

#[test]
fn e2e_smoke_test_missing_config() {
    let dir = tempdir().expect("Failed to create temp directory");
    let file = dir.path().join("page.md");
    fs::write(&file, "$x$").unwrap();

    let err = run(&args(&file, None, Some(&dir.path().join("absent.toml")))).unwrap_err();
    assert!(matches!(err, MathfixError::Config(_)));
}
