use clap::Parser;
use everkeep_cli::{Args, GrantView, execute};
use everkeep_crypto::MasterSecret;
use pretty_assertions::assert_eq;

fn run(secret: &str, argv: &[&str]) -> everkeep_cli::Outcome {
    let mut full = vec!["everkeep", "--master-secret", secret];
    full.extend_from_slice(argv);
    execute(&Args::try_parse_from(full).unwrap()).unwrap()
}

fn test_secret() -> String {
    MasterSecret::from_bytes([7; 32]).to_base64()
}

#[test]
fn gen_secret_is_loadable() {
    let outcome = run(&test_secret(), &["gen-secret"]);
    assert!(outcome.success);
    assert!(MasterSecret::from_base64(&outcome.output).is_ok());
}

#[test]
fn seal_then_open() {
    let secret = test_secret();
    let sealed = run(&secret, &["seal", "--owner", "u1", "--context", "v42", "My Vault"]);
    assert!(sealed.success);
    assert!(sealed.output.starts_with("ek1:"));

    let opened = run(&secret, &["open", "--owner", "u1", "--context", "v42", sealed.output.as_str()]);
    assert_eq!(opened.output, "My Vault");
}

#[test]
fn open_falls_back_to_placeholder() {
    let secret = test_secret();
    let staged = run(&secret, &["seal", "--owner", "u1", "--context", "new", "My Vault"]);
    let opened = run(&secret, &["open", "--owner", "u1", "--context", "v42", staged.output.as_str()]);
    assert!(opened.success);
    assert_eq!(opened.output, "My Vault");
}

#[test]
fn open_reports_unreadable_values() {
    let secret = test_secret();
    let sealed = run(&secret, &["seal", "--owner", "u2", "--context", "v42", "x"]);
    let opened = run(&secret, &["open", "--owner", "u1", "--context", "v42", sealed.output.as_str()]);
    assert!(!opened.success);
}

#[test]
fn inspect_classifies_values() {
    let secret = test_secret();
    let sealed = run(&secret, &["seal", "--owner", "u1", "--context", "v1", "x"]);
    assert_eq!(run(&secret, &["inspect", sealed.output.as_str()]).output, "envelope");
    assert_eq!(run(&secret, &["inspect", "My Vault"]).output, "plaintext");
}

#[test]
fn issue_then_verify_token() {
    let secret = test_secret();
    let token = run(&secret, &["issue-token", "--owner", "u1", "--resource", "v42", "--ttl", "60"]);
    assert!(token.success);

    let verified = run(&secret, &["verify-token", token.output.as_str()]);
    assert!(verified.success);
    let view: GrantView = serde_json::from_str(&verified.output).unwrap();
    assert_eq!(view.owner, "u1");
    assert_eq!(view.resource, "v42");
}

#[test]
fn verify_rejects_token_from_other_secret() {
    let token = run(&test_secret(), &["issue-token", "--owner", "u1", "--resource", "v42"]);
    let other = MasterSecret::from_bytes([8; 32]).to_base64();
    let verified = run(&other, &["verify-token", token.output.as_str()]);
    assert!(!verified.success);
    assert!(verified.output.contains("signature"));
}

#[test]
fn empty_owner_is_an_error() {
    let args = Args::try_parse_from([
        "everkeep",
        "--master-secret",
        test_secret().as_str(),
        "seal",
        "--owner",
        "",
        "--context",
        "v1",
        "x",
    ])
    .unwrap();
    assert!(execute(&args).is_err());
}

#[test]
fn bad_master_secret_is_an_error() {
    let args = Args::try_parse_from(["everkeep", "--master-secret", "short", "inspect", "x"]).unwrap();
    // inspect needs no secret
    assert!(execute(&args).is_ok());

    let args = Args::try_parse_from([
        "everkeep",
        "--master-secret",
        "short",
        "seal",
        "--owner",
        "u1",
        "--context",
        "v1",
        "x",
    ])
    .unwrap();
    assert!(execute(&args).is_err());
}

#[test]
fn secret_is_read_from_named_env_var() {
    let var = "EVERKEEP_CLI_TEST_SECRET_FROM_ENV";
    // SAFETY: the variable name is unique to this test.
    unsafe { std::env::set_var(var, test_secret()) };

    let args = Args::try_parse_from([
        "everkeep", "--secret-env", var, "seal", "--owner", "u1", "--context", "v1", "x",
    ])
    .unwrap();
    assert_eq!(args.config().master_secret_env, var);
    let sealed = execute(&args).unwrap().output;

    let opened = run(&test_secret(), &["open", "--owner", "u1", "--context", "v1", sealed.as_str()]);
    assert_eq!(opened.output, "x");
}

#[test]
fn missing_secret_env_var_is_an_error() {
    let args = Args::try_parse_from([
        "everkeep",
        "--secret-env",
        "EVERKEEP_CLI_TEST_SECRET_NEVER_SET",
        "issue-token",
        "--owner",
        "u1",
        "--resource",
        "v1",
    ])
    .unwrap();
    let err = execute(&args).unwrap_err();
    assert!(format!("{err:#}").contains("EVERKEEP_CLI_TEST_SECRET_NEVER_SET"));
}
