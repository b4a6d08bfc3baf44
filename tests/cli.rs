use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn jqpath() -> Command {
    let mut cmd = Command::cargo_bin("jqpath").unwrap();
    cmd.env_remove("RUST_LOG").env("NO_COLOR", "1");
    cmd
}

fn json_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn null_input_literal() {
    jqpath()
        .args(["-n", "true"])
        .assert()
        .success()
        .stdout("true\n");
}

#[test]
fn missing_key_reports_and_exits_5() {
    jqpath()
        .arg(".missing")
        .write_stdin("{}")
        .assert()
        .code(5)
        .stdout("")
        .stderr(predicate::str::contains("jqpath: error (at <stdin>:1)"))
        .stderr(predicate::str::contains("key \"missing\" not found"));
}

#[test]
fn optional_missing_key_is_silent() {
    jqpath()
        .arg(".missing?")
        .write_stdin("{}")
        .assert()
        .success()
        .stdout("")
        .stderr("");
}

#[test]
fn identity_pretty_prints() {
    jqpath()
        .write_stdin(r#"{"b":1,"a":[1,2]}"#)
        .assert()
        .success()
        .stdout("{\n  \"b\": 1,\n  \"a\": [\n    1,\n    2\n  ]\n}\n");
}

#[test]
fn compact_output() {
    jqpath()
        .args(["-c", ".[] | {id: .id, label: .name}"])
        .write_stdin(r#"[{"id": 1, "name": "x"}, {"id": 2, "name": "y"}]"#)
        .assert()
        .success()
        .stdout("{\"id\":1,\"label\":\"x\"}\n{\"id\":2,\"label\":\"y\"}\n");
}

#[test]
fn raw_output() {
    jqpath()
        .args(["-r", ".[]"])
        .write_stdin(r#"["a b", 1, "c"]"#)
        .assert()
        .success()
        .stdout("a b\n1\nc\n");
}

#[test]
fn join_output() {
    jqpath()
        .args(["-j", ".[]"])
        .write_stdin(r#"["a", "b", 3]"#)
        .assert()
        .success()
        .stdout("ab3");
}

#[test]
fn tab_and_indent() {
    jqpath()
        .arg("--tab")
        .write_stdin("[1]")
        .assert()
        .success()
        .stdout("[\n\t1\n]\n");
    jqpath()
        .args(["--indent", "4"])
        .write_stdin("[1]")
        .assert()
        .success()
        .stdout("[\n    1\n]\n");
}

#[test]
fn indent_out_of_range_is_usage_error() {
    jqpath().args(["--indent", "9"]).write_stdin("1").assert().code(2);
}

#[test]
fn multiple_documents_on_stdin() {
    jqpath()
        .arg(".a")
        .write_stdin("{\"a\":1}\n{\"a\":2} {\"a\":3}")
        .assert()
        .success()
        .stdout("1\n2\n3\n");
}

#[test]
fn slurp_across_files() {
    let first = json_file("1 2");
    let second = json_file("[3]");
    jqpath()
        .args(["-c", "-s", "."])
        .arg(first.path())
        .arg(second.path())
        .assert()
        .success()
        .stdout("[1,2,[3]]\n");
}

#[test]
fn files_are_read_in_order() {
    let first = json_file(r#"{"n": "first"}"#);
    let second = json_file(r#"{"n": "second"}"#);
    jqpath()
        .args(["-r", ".n"])
        .arg(first.path())
        .arg(second.path())
        .assert()
        .success()
        .stdout("first\nsecond\n");
}

#[test]
fn unreadable_file_exits_2() {
    jqpath()
        .args([".", "/no/such/file.json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("reading /no/such/file.json"));
}

#[test]
fn syntax_error_exits_2() {
    jqpath()
        .arg(".a |")
        .write_stdin("{}")
        .assert()
        .code(2)
        .stdout("")
        .stderr(predicate::str::contains("syntax error at position 4"));
}

#[test]
fn unknown_function_is_syntax_error() {
    jqpath()
        .arg("length")
        .write_stdin("[]")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("length/0 is not defined"));
}

#[test]
fn invalid_json_input_exits_2() {
    jqpath()
        .arg(".")
        .write_stdin("{\"a\": 1} {\"a\": ")
        .assert()
        .code(2)
        .stdout("{\n  \"a\": 1\n}\n")
        .stderr(predicate::str::contains("invalid JSON input"));
}

#[test]
fn continues_after_evaluation_error() {
    jqpath()
        .args(["-c", ".a"])
        .write_stdin("{\"a\":1} 5 {\"a\":3}")
        .assert()
        .code(5)
        .stdout("1\n3\n")
        .stderr(predicate::str::contains("(at <stdin>:2): Cannot index number with \"a\""));
}

#[test]
fn halt_on_error_stops() {
    jqpath()
        .args(["--halt-on-error", "-c", ".a"])
        .write_stdin("{\"a\":1} 5 {\"a\":3}")
        .assert()
        .code(5)
        .stdout("1\n");
}

#[test]
fn outputs_before_error_are_kept() {
    jqpath()
        .args(["-c", ".[] | .a"])
        .write_stdin(r#"[{"a": 1}, "x", {"a": 3}]"#)
        .assert()
        .code(5)
        .stdout("1\n");
}

#[test]
fn exit_status_flag() {
    jqpath().args(["-e", ".ok"]).write_stdin(r#"{"ok": true}"#).assert().code(0);
    jqpath().args(["-e", ".ok"]).write_stdin(r#"{"ok": false}"#).assert().code(1);
    jqpath().args(["-e", ".ok"]).write_stdin(r#"{"ok": null}"#).assert().code(1);
    jqpath().args(["-e", "empty"]).write_stdin("{}").assert().code(4);
}

#[test]
fn literal_is_printed_once_per_document() {
    jqpath()
        .arg("\"hi\"")
        .write_stdin("1 2")
        .assert()
        .success()
        .stdout("\"hi\"\n\"hi\"\n");
}

#[test]
fn color_output_forced() {
    jqpath()
        .args(["-C", "-c", "."])
        .write_stdin(r#"{"a":null}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("\x1b[1;34m\"a\"\x1b[0m"));
}

#[test]
fn monochrome_wins() {
    jqpath()
        .args(["-C", "-M", "-c", "."])
        .write_stdin("[true]")
        .assert()
        .success()
        .stdout("[true]\n");
}

#[test]
fn big_integers_round_trip() {
    jqpath()
        .arg(".n")
        .write_stdin(r#"{"n": 100000000000000000000000}"#)
        .assert()
        .success()
        .stdout("100000000000000000000000\n");
}

#[test]
fn debug_logging_goes_to_stderr() {
    jqpath()
        .env("RUST_LOG", "debug")
        .args(["-c", "."])
        .write_stdin("[1]")
        .assert()
        .success()
        .stdout("[1]\n")
        .stderr(predicate::str::contains("parsed filter"));
}
