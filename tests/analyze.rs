use rulefix::fixer::apply_single_fix;
use rulefix::models::{AnalysisResult, Severity};
use rulefix::report::NO_ISSUES_MESSAGE;
use rulefix::{analyze_file, analyze_files_parallel, analyze_with_options, collect_python_files};
use rulefix::{AnalyzerOptions, APPLIED_FIX_RULE_ID, NOT_PYTHON_RULE_ID, SYNTAX_ERROR_RULE_ID};
use std::fs;
use tempfile::TempDir;

fn options() -> AnalyzerOptions {
    AnalyzerOptions {
        scratch_file: None,
        ..Default::default()
    }
}

fn run(code: &str, auto_fix: bool) -> AnalysisResult {
    analyze_with_options(code, auto_fix, &options())
}

#[test]
fn test_foreign_language_rejected() {
    let code = r#"public class Main {
    public static void main(String[] args) {
        System.out.println("hi");
        int x = 1;
        int y = 2;
    }
}
"#;
    let result = run(code, true);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].rule_id, NOT_PYTHON_RULE_ID);
    assert_eq!(result.diagnostics[0].severity, Severity::Error);
    assert_eq!(result.fixed_source, code);
    assert!(result.highlights.is_empty());
    assert!(result.fixes.is_empty());
    assert!(result
        .report
        .starts_with("Found 1 errors, 0 warnings, 0 info.\nERROR (line 0): Input does not appear to be Python code."));
}

#[test]
fn test_clean_code_reports_no_issues() {
    let code = "def greet(name):\n    return name.upper()\n\n\nprint(greet(\"ada\"))\n";
    let result = run(code, false);
    assert_eq!(result.report, NO_ISSUES_MESSAGE);
    assert!(result.highlights.is_empty());
    assert_eq!(result.fixed_source, code);

    let fixed = run(code, true);
    assert_eq!(fixed.report, NO_ISSUES_MESSAGE);
    assert_eq!(fixed.fixed_source, code);
    assert!(fixed.fixes.is_empty());
}

#[test]
fn test_zero_divisor_call_flagged() {
    let code = "def f(a, b): return a / b\n\nprint(f(10, 0))\n";
    let result = run(code, false);
    let zero: Vec<_> = result
        .diagnostics
        .iter()
        .filter(|d| d.rule_id == "PYF007")
        .collect();
    assert_eq!(zero.len(), 1);
    assert_eq!(zero[0].line, 3);
    assert_eq!(zero[0].severity, Severity::Error);
    assert!(zero[0].message.contains("parameter 'b'"));
    assert!(result.highlights.contains(&3));
}

#[test]
fn test_nonzero_argument_not_flagged() {
    let code = "def f(a, b): return a / b\n\nprint(f(10, 5))\n";
    let result = run(code, false);
    assert!(result.diagnostics.iter().all(|d| d.rule_id != "PYF007"));
    assert_eq!(result.error_count(), 0);
}

#[test]
fn test_guard_inserted_when_fixing() {
    let code = "def f(a, b): return a / b\n\nprint(f(10, 0))\n";
    let result = run(code, true);
    assert_eq!(
        result.fixed_source,
        "def f(a, b):\n    if b == 0:\n        return None\n    return a / b\n\nprint(f(10, 0))\n"
    );
    assert_eq!(result.fixes.len(), 1);
    assert!(result.report.contains("Inserted guard for divisor 'b' in function 'f'"));
    assert!(result
        .diagnostics
        .iter()
        .any(|d| d.rule_id == APPLIED_FIX_RULE_ID && d.line == 2));
}

#[test]
fn test_guard_keeps_header_comment() {
    let code = "def f(a, b):  # ratio\n  return a / b\n\nprint(f(1, 0))\n";
    let result = run(code, true);
    assert_eq!(
        result.fixed_source,
        "def f(a, b):  # ratio\n  if b == 0:\n      return None\n  return a / b\n\nprint(f(1, 0))\n"
    );
    assert!(rulefix::parser::parses(&result.fixed_source));
}

#[test]
fn test_call_findings_reported_in_walk_order() {
    let result = run("print(a + b)\neval(x)\n", false);
    let lines: Vec<_> = result.diagnostics.iter().map(|d| d.line).collect();
    assert_eq!(lines, vec![1, 2]);
    let body: Vec<_> = result.report.lines().skip(1).filter(|l| !l.starts_with(' ')).collect();
    assert!(body[0].starts_with("WARNING (line 1): String concatenation"));
    assert!(body[1].starts_with("WARNING (line 2): Use of dangerous function 'eval'"));
}

#[test]
fn test_unused_variable_reported_at_assignment() {
    let code = "print('start')\nunused_var = 5\nprint('done')\n";
    let result = run(code, false);
    let unused: Vec<_> = result
        .diagnostics
        .iter()
        .filter(|d| d.rule_id == "PYF001")
        .collect();
    assert_eq!(unused.len(), 1);
    assert_eq!(unused[0].line, 2);
    assert_eq!(unused[0].severity, Severity::Warning);
    assert!(unused[0].message.contains("unused_var"));
}

#[test]
fn test_off_by_one_fixed() {
    let code = "arr = [1, 2, 3]\nfor i in range(len(arr) + 1):\n    print(i)\n";
    let result = run(code, true);
    assert!(result.fixed_source.contains("for i in range(len(arr)):"));
    assert!(!result.fixed_source.contains("+ 1"));

    let fix = &result.fixes[0];
    assert_eq!(fix.line, 2);
    assert!(fix.original.contains("range(len(arr) + 1)"));
    assert!(fix.replacement.contains("range(len(arr))"));
}

#[test]
fn test_index_loop_rewritten() {
    let code = "arr = [1, 2, 3]\ntotal = 0\nfor i in range(len(arr)):\n    total += arr[i]\nprint(total)\n";
    let result = run(code, true);
    assert!(result
        .fixed_source
        .contains("for arr_item in arr:\n    total += arr_item\n"));
    assert!(!result.fixed_source.contains("arr[i]"));
}

#[test]
fn test_index_loop_without_subscript_unchanged() {
    let code = "arr = [4, 5]\nfor i in range(len(arr)):\n    print(i)\n";
    let result = run(code, true);
    assert_eq!(result.fixed_source, code);
    assert!(result.fixes.is_empty());
}

#[test]
fn test_none_comparison_fixed() {
    let code = "value = None\nif value == None:\n    print(value)\n";
    let result = run(code, true);
    assert!(result.fixed_source.contains("value is None"));
    assert!(!result.fixed_source.contains("== None"));
}

#[test]
fn test_bare_except_fixed() {
    let code = "try:\n    print(1)\nexcept:\n    print(2)\n";
    let result = run(code, true);
    assert!(result.fixed_source.contains("except Exception as e:"));
    assert!(result.highlights.contains(&3));
}

#[test]
fn test_syntax_error_reported() {
    let code = "x = 1\nif x > 0\n    print(x)\n";
    let result = run(code, false);
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].rule_id, SYNTAX_ERROR_RULE_ID);
    assert_eq!(result.diagnostics[0].line, 2);
    assert!(result.diagnostics[0].message.starts_with("SyntaxError: "));
    assert_eq!(result.highlights, vec![2]);
    assert_eq!(result.fixed_source, code);
    assert!(result.fixes.is_empty());
}

#[test]
fn test_syntax_error_at_end_of_input_highlights_real_line() {
    let code = "def f(\n";
    let result = run(code, false);
    assert_eq!(result.diagnostics[0].rule_id, SYNTAX_ERROR_RULE_ID);
    assert_eq!(result.diagnostics[0].line, 1);
    assert_eq!(result.highlights, vec![1]);
}

#[test]
fn test_syntax_error_repaired_when_fixing() {
    let code = "x = 1\nif x > 0\n    print(x)\n";
    let result = run(code, true);
    assert_eq!(result.fixed_source, "x = 1\nif x > 0:\n    print(x)\n");
    assert_eq!(result.fixes.len(), 1);
    assert!(result
        .report
        .contains("INFO (line 2): Inserted missing colon at end of block header"));
    assert!(rulefix::parser::parses(&result.fixed_source));
}

#[test]
fn test_unrepairable_syntax_error_keeps_text() {
    let code = "def broken(:\n    pass\n";
    let result = run(code, true);
    assert_eq!(result.fixed_source, code);
    assert!(result.fixes.is_empty());
    assert_eq!(result.error_count(), 1);
}

#[test]
fn test_apply_single_fix_from_result() {
    let code = "items = [1, 2]\nfor i in range(len(items) + 1):\n    print(i)\n";
    let result = run(code, true);
    let applied = apply_single_fix(code, &result.fixes[0]);
    assert_eq!(
        applied,
        "items = [1, 2]\nfor i in range(len(items)):\n    print(i)\n"
    );
}

#[test]
fn test_scratch_file_written() {
    let dir = TempDir::new().unwrap();
    let scratch = dir.path().join("scratch.py");
    let opts = AnalyzerOptions {
        scratch_file: Some(scratch.clone()),
        ..Default::default()
    };
    analyze_with_options("print('hello')\n", false, &opts);
    assert_eq!(fs::read_to_string(&scratch).unwrap(), "print('hello')\n");
}

#[test]
fn test_analyze_files_from_disk() {
    let dir = TempDir::new().unwrap();
    let pkg = dir.path().join("pkg");
    let venv = dir.path().join("venv");
    fs::create_dir_all(&pkg).unwrap();
    fs::create_dir_all(&venv).unwrap();
    fs::write(pkg.join("a.py"), "eval('1')\n").unwrap();
    fs::write(pkg.join("b.py"), "print('ok')\n").unwrap();
    fs::write(pkg.join("notes.txt"), "eval\n").unwrap();
    fs::write(venv.join("c.py"), "exec('1')\n").unwrap();

    let root = dir.path().to_string_lossy().to_string();
    let files = collect_python_files(&[root], &["venv".to_string()]);
    assert_eq!(files.len(), 2);

    let reports = analyze_files_parallel(&files, false, &options());
    let dangerous: usize = reports
        .iter()
        .flat_map(|r| &r.result.diagnostics)
        .filter(|d| d.rule_id == "PYF003")
        .count();
    assert_eq!(dangerous, 1);

    let single = analyze_file(&pkg.join("b.py"), false, &options()).unwrap();
    assert_eq!(single.report, NO_ISSUES_MESSAGE);
    assert!(analyze_file(&pkg.join("missing.py"), false, &options()).is_err());
}
