use argot_parser::{InterpretError, Outcome, UsageError, UsageSpec, Value, interpret};

const NAVAL_FATE: &str = "\
Naval Fate.

Usage:
  naval_fate ship new <name>...
  naval_fate ship <name> move <x> <y> [--speed=<kn>]
  naval_fate ship shoot <x> <y>
  naval_fate mine (set|remove) <x> <y> [--moored|--drifting]
  naval_fate -h | --help
  naval_fate --version

Options:
  -h --help     Show this screen.
  --version     Show version.
  --speed=<kn>  Speed in knots [default: 10].
  --moored      Moored (anchored) mine.
  --drifting    Drifting mine.
";

fn naval_fate() -> UsageSpec {
    UsageSpec::parse(NAVAL_FATE)
        .expect("naval fate doc should compile")
        .with_version("1.0")
}

fn matched(spec: &UsageSpec, argv: &[&str]) -> argot_parser::ArgMap {
    match spec.evaluate(argv.iter().copied()) {
        Ok(Outcome::Matched(map)) => map,
        other => panic!("expected a match for {argv:?}, got {other:?}"),
    }
}

#[test]
fn test_commands_and_positionals_bind_from_one_line() {
    let spec = UsageSpec::parse("Usage: cmd go <x> <y>").unwrap();
    let map = matched(&spec, &["go", "1", "2"]);
    assert!(map.get_bool("go"));
    assert_eq!(map.get_str("<x>"), "1");
    assert_eq!(map.get_str("<y>"), "2");
    assert_eq!(map.len(), 3);
}

#[test]
fn test_required_alternation_binds_chosen_and_defaults_other() {
    let doc = "\
Usage: cmd (--moored|--drifting)

Options:
  --moored    Moored mine.
  --drifting  Drifting mine.
";
    let spec = UsageSpec::parse(doc).unwrap();
    let map = matched(&spec, &["--moored"]);
    assert_eq!(map.get("--moored"), Some(&Value::Switch(true)));
    assert_eq!(map.get("--drifting"), Some(&Value::Switch(false)));

    let err = spec.evaluate(Vec::<String>::new()).unwrap_err();
    assert_eq!(err, UsageError::NoMatch);
}

#[test]
fn test_repeated_positional_collects_list_and_default_applies() {
    let spec = naval_fate();
    let map = matched(&spec, &["ship", "Titanic", "move", "1", "2"]);
    // <name> repeats on the "ship new" line, so it is list-valued on every
    // line it appears in.
    assert_eq!(map.get_vec("<name>"), ["Titanic"]);
    assert!(map.get_bool("move"));
    assert_eq!(map.get_str("<x>"), "1");
    assert_eq!(map.get_str("<y>"), "2");
    assert_eq!(map.get_str("--speed"), "10");

    let map = matched(&spec, &["ship", "new", "Titanic", "Bismarck"]);
    assert_eq!(map.get_vec("<name>"), ["Titanic", "Bismarck"]);
    assert!(map.get_bool("new"));
}

#[test]
fn test_repeated_optional_flag_counts_occurrences() {
    let spec = UsageSpec::parse("Usage: prog [-v]...").unwrap();
    let map = matched(&spec, &["-v", "-v"]);
    assert_eq!(map.get_count("-v"), 2);

    let map = matched(&spec, &[]);
    assert_eq!(map.get_count("-v"), 0);
}

#[test]
fn test_single_line_grammar_with_repetition_and_default() {
    let doc = "\
Usage: cmd ship <name>... move <x> <y> [--speed=<kn>]

Options:
  --speed=<kn>  Speed in knots [default: 10].
";
    let spec = UsageSpec::parse(doc).unwrap();
    let map = matched(&spec, &["ship", "Titanic", "Bismarck", "move", "1", "2"]);
    assert!(map.get_bool("ship"));
    assert_eq!(map.get_vec("<name>"), ["Titanic", "Bismarck"]);
    assert!(map.get_bool("move"));
    assert_eq!(map.get_str("<x>"), "1");
    assert_eq!(map.get_str("<y>"), "2");
    assert_eq!(map.get_str("--speed"), "10");
    assert_eq!(map.len(), 6);
}

#[test]
fn test_inline_option_value_overrides_default() {
    let spec = naval_fate();
    let map = matched(&spec, &["ship", "Titanic", "move", "3", "4", "--speed=21"]);
    assert_eq!(map.get_str("--speed"), "21");

    let map = matched(&spec, &["ship", "Titanic", "move", "3", "4", "--speed", "7"]);
    assert_eq!(map.get_str("--speed"), "7");
}

#[test]
fn test_mine_line_takes_alternation_and_optional_flags() {
    let spec = naval_fate();
    let map = matched(&spec, &["mine", "set", "5", "6", "--drifting"]);
    assert!(map.get_bool("mine"));
    assert!(map.get_bool("set"));
    assert!(!map.get_bool("remove"));
    assert!(map.get_bool("--drifting"));
    assert!(!map.get_bool("--moored"));

    let map = matched(&spec, &["mine", "remove", "5", "6"]);
    assert!(map.get_bool("remove"));
}

#[test]
fn test_help_trigger_wins_anywhere() {
    let spec = naval_fate();
    match spec.evaluate(["mine", "bogus", "-h", "whatever"]) {
        Ok(Outcome::Help(text)) => assert_eq!(text, NAVAL_FATE),
        other => panic!("expected help, got {other:?}"),
    }
    match spec.evaluate(["--help"]) {
        Ok(Outcome::Help(_)) => {}
        other => panic!("expected help, got {other:?}"),
    }
}

#[test]
fn test_version_trigger_requires_configured_version() {
    let spec = naval_fate();
    match spec.evaluate(["--version"]) {
        Ok(Outcome::Version(v)) => assert_eq!(v, "1.0"),
        other => panic!("expected version, got {other:?}"),
    }

    // Without a version string the token falls through to matching, where
    // the bare `--version` line accepts it.
    let unversioned = UsageSpec::parse(NAVAL_FATE).unwrap();
    let map = matched(&unversioned, &["--version"]);
    assert!(map.get_bool("--version"));
}

#[test]
fn test_help_can_be_disabled() {
    let spec = naval_fate().help(false);
    let map = matched(&spec, &["-h"]);
    assert!(map.get_bool("--help"));
}

#[test]
fn test_arity_conflict_between_options_and_usage_blocks() {
    let doc = "\
Usage: cmd [--speed]

Options:
  --speed=<kn>  Speed in knots.
";
    let err = UsageSpec::parse(doc).unwrap_err();
    assert_eq!(
        err,
        argot_parser::GrammarError::ArityConflict("--speed".to_string())
    );
}

#[test]
fn test_all_optional_alternation_accepts_empty_argv() {
    let spec = UsageSpec::parse("Usage: cmd [go] | [stop <x>]").unwrap();
    let map = matched(&spec, &[]);
    assert!(!map.get_bool("go"));
    assert!(!map.get_bool("stop"));
    assert_eq!(map.get("<x>"), Some(&Value::Plain(None)));
}

#[test]
fn test_first_matching_line_wins_in_source_order() {
    let spec = UsageSpec::parse("Usage:\n  cmd <a> <b>\n  cmd <b> <a>\n").unwrap();
    let map = matched(&spec, &["1", "2"]);
    assert_eq!(map.get_str("<a>"), "1");
    assert_eq!(map.get_str("<b>"), "2");
}

#[test]
fn test_evaluation_is_idempotent() {
    let spec = naval_fate();
    let argv = ["ship", "new", "Titanic", "Bismarck"];
    let first = matched(&spec, &argv);
    for _ in 0..3 {
        assert_eq!(matched(&spec, &argv), first);
    }
}

#[test]
fn test_no_match_reports_usage_error() {
    let spec = naval_fate();
    assert_eq!(
        spec.evaluate(["ship"]).unwrap_err(),
        UsageError::NoMatch
    );
    assert_eq!(
        spec.evaluate(["mine", "detonate", "1", "2"]).unwrap_err(),
        UsageError::NoMatch
    );
}

#[test]
fn test_strict_mode_rejects_unknown_and_ambiguous_options() {
    let spec = naval_fate();
    assert_eq!(
        spec.evaluate(["ship", "new", "x", "--warp"]).unwrap_err(),
        UsageError::Unknown("--warp".to_string())
    );

    let doc = "\
Usage: cmd [--moored | --monitor]

Options:
  --moored   Moored.
  --monitor  Monitor.
";
    let spec = UsageSpec::parse(doc).unwrap();
    assert_eq!(
        spec.evaluate(["--mo"]).unwrap_err(),
        UsageError::Ambiguous {
            given: "--mo".to_string(),
            candidates: vec!["--monitor".to_string(), "--moored".to_string()],
        }
    );
}

#[test]
fn test_unique_abbreviation_is_accepted() {
    let spec = naval_fate();
    let map = matched(&spec, &["ship", "Titanic", "move", "1", "2", "--sp", "9"]);
    assert_eq!(map.get_str("--speed"), "9");
}

#[test]
fn test_permissive_mode_captures_unknown_options() {
    let doc = "Usage: cmd go";
    let spec = UsageSpec::parse(doc).unwrap().permissive(true);
    let map = match spec.evaluate(["go", "--warp=9", "-x"]) {
        Ok(Outcome::Matched(map)) => map,
        other => panic!("expected a match, got {other:?}"),
    };
    assert_eq!(map.get_str("--warp"), "9");
    assert!(map.get_bool("-x"));
    assert!(map.get_bool("go"));
}

#[test]
fn test_double_dash_separates_positionals() {
    let spec = UsageSpec::parse("Usage: cmd [--] <file>").unwrap();
    let map = matched(&spec, &["--", "-not-an-option"]);
    assert_eq!(map.get_str("<file>"), "-not-an-option");
    assert!(map.get_bool("--"));

    let map = matched(&spec, &["plain"]);
    assert_eq!(map.get_str("<file>"), "plain");
    assert!(!map.get_bool("--"));
}

#[test]
fn test_interpret_pairs_usage_text_with_errors() {
    let err = interpret(NAVAL_FATE, ["ship"]).unwrap_err();
    let InterpretError::Usage { source, usage } = err else {
        panic!("expected a usage error");
    };
    assert_eq!(source, UsageError::NoMatch);
    assert!(usage.starts_with("Usage:"));
    assert!(usage.contains("naval_fate ship new <name>..."));

    let err = interpret("no usage here", Vec::<String>::new()).unwrap_err();
    assert!(matches!(err, InterpretError::Grammar(_)));
}
