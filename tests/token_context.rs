use proptest::prelude::*;
use std::fs;

use stoken::{ErrorKind, Seed, Status, Token, TokenConfig, TokenContext, TokenError, TokenFlags};

const SERIAL: &str = "000123456789";
const AT: i64 = 1_700_000_040;

fn flags(interval: u32) -> TokenFlags {
    let mut flags = TokenFlags::TIME_DERIVED | TokenFlags::KEY_128BIT;
    flags.set_digits(8);
    flags.set_interval(interval);
    flags.set_pin_mode(0);
    flags
}

fn seeded_context(seed: [u8; 16], interval: u32) -> TokenContext {
    let token = Token::from_seed(SERIAL, Seed::from_bytes(seed), flags(interval), 9000).unwrap();
    let mut ctx = TokenContext::new();
    ctx.set_token(token);
    ctx
}

fn exported(pass: Option<&str>, devid: Option<&str>) -> String {
    seeded_context([0x42; 16], 60).encrypt_seed(pass, devid).unwrap()
}

#[test]
fn unprotected_token_round_trip() {
    let source = seeded_context([9; 16], 60);
    let token = source.encrypt_seed(None, None).unwrap();
    assert!(token.starts_with('2'));

    let mut ctx = TokenContext::new();
    ctx.import_string(&token).unwrap();
    assert!(!ctx.pass_required());
    assert!(!ctx.devid_required());
    assert!(ctx.seed().is_none());

    ctx.decrypt_seed(None, None).unwrap();
    assert_eq!(ctx.seed(), source.seed());
    assert_eq!(
        ctx.compute_tokencode(AT, None).unwrap(),
        source.compute_tokencode(AT, None).unwrap()
    );

    let info = ctx.info().unwrap();
    assert_eq!(info.serial, SERIAL);
    assert_eq!(info.interval, 60);
    assert_eq!(info.token_version, 2);
    assert!(!info.uses_pin);
}

#[test]
fn codes_change_on_interval_boundaries() {
    let ctx = seeded_context([3; 16], 60);
    let first = ctx.compute_tokencode(AT, None).unwrap();
    assert_eq!(first, ctx.compute_tokencode(AT + 59, None).unwrap());
    assert_ne!(first, ctx.compute_tokencode(AT + 60, None).unwrap());
    assert_eq!(first.len(), 8);
}

#[test]
fn wrong_password_leaves_seed_unloaded() {
    let mut ctx = TokenContext::new();
    ctx.import_string(&exported(Some("right"), None)).unwrap();
    assert!(ctx.pass_required());

    let err = ctx.decrypt_seed(Some("wrong"), None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    assert!(ctx.seed().is_none());

    let err = ctx.decrypt_seed(None, None).unwrap_err();
    assert!(matches!(err, TokenError::MissingPassword));

    ctx.decrypt_seed(Some("right"), None).unwrap();
    assert_eq!(ctx.seed(), Some(&Seed::from_bytes([0x42; 16])));
}

#[test]
fn device_bound_token() {
    let devid = "0123456789ABCDEF0123456789ABCDEF";
    let mut ctx = TokenContext::new();
    ctx.import_string(&exported(None, Some(devid))).unwrap();

    assert!(ctx.devid_required());
    assert!(ctx.check_devid(devid));
    assert!(!ctx.check_devid("FEDCBA9876543210FEDCBA9876543210"));

    let err = ctx.decrypt_seed(None, Some("FEDCBA9876543210FEDCBA9876543210")).unwrap_err();
    assert!(matches!(err, TokenError::BadDeviceId));
    assert!(ctx.seed().is_none());

    ctx.decrypt_seed(None, Some(devid)).unwrap();
    assert!(ctx.seed().is_some());
}

#[test]
fn corrupted_checksum_is_rejected() {
    let mut token = exported(None, None);
    let last = token.pop().unwrap();
    let digit = (last as u8 - b'0' + 1) % 8;
    token.push(char::from(b'0' + digit));

    let mut ctx = TokenContext::new();
    let err = ctx.import_string(&token).unwrap_err();
    assert!(matches!(err, TokenError::ChecksumFailed));
    assert_eq!(err.status(), Status::InvalidFormat);
    assert!(ctx.info().is_none());
}

#[test]
fn truncated_token_is_rejected() {
    let token = exported(None, None);
    let mut ctx = TokenContext::new();
    let err = ctx.import_string(&token[..60]).unwrap_err();
    assert!(matches!(err, TokenError::BadLength));
    assert_eq!(err.kind(), ErrorKind::InvalidFormat);
}

#[test]
fn pin_checks_do_not_touch_state() {
    let mut ctx = TokenContext::new();
    ctx.import_string(&exported(Some("pw"), None)).unwrap();
    let before = ctx.info();

    for _ in 0..5 {
        assert!(!ctx.check_pin("12a4"));
        assert!(!ctx.check_pin("123456789"));
    }
    assert_eq!(ctx.info(), before);
    assert!(ctx.seed().is_none());
    assert!(ctx.check_pin("12345678"));
}

#[test]
fn version_3_round_trip() {
    let source = seeded_context([0x5a; 16], 30);
    let token = source.token().unwrap();
    let devid = "556f1985-33dd-442c-9155-3a0e994f21b1";
    let encoded = token.encode(Some("secret"), Some(devid), 3, true).unwrap();

    let mut ctx = TokenContext::new();
    ctx.import_string(&format!("http://127.0.0.1/securid/ctf?ctfData={encoded}"))
        .unwrap();
    assert_eq!(ctx.info().unwrap().token_version, 3);
    assert!(ctx.check_devid(devid));

    ctx.decrypt_seed(Some("secret"), Some(devid)).unwrap();
    assert_eq!(ctx.seed(), source.seed());
    assert_eq!(ctx.info().unwrap().serial, SERIAL);
    assert_eq!(
        ctx.compute_tokencode(AT, None).unwrap(),
        source.compute_tokencode(AT, None).unwrap()
    );
}

#[test]
fn import_from_rcfile() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stokenrc");
    TokenConfig::new(exported(None, None), Some("0000".into()))
        .write(Some(&path))
        .unwrap();

    let mut ctx = TokenContext::new();
    ctx.import_rcfile(Some(&path)).unwrap();
    ctx.decrypt_seed(None, None).unwrap();
    assert!(!ctx.pin_required());

    let missing = dir.path().join("nothing-here");
    let err = ctx.import_rcfile(Some(&missing)).unwrap_err();
    assert_eq!(err.status(), Status::NotFound);
    assert!(ctx.seed().is_some());
}

#[test]
fn rcfile_version_must_match() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stokenrc");
    fs::write(&path, format!("version = 7\ntoken = \"{}\"\n", exported(None, None))).unwrap();

    let mut ctx = TokenContext::new();
    let err = ctx.import_rcfile(Some(&path)).unwrap_err();
    assert!(matches!(err, TokenError::TokenVersion));
}

#[test]
fn import_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token.txt");
    fs::write(
        &path,
        format!("Your token follows\n\n{}\n", exported(None, None)),
    )
    .unwrap();

    let mut ctx = TokenContext::new();
    ctx.import_file(&path).unwrap();
    assert_eq!(ctx.info().unwrap().serial, SERIAL);

    let err = ctx.import_file(&dir.path().join("missing.txt")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.status().code(), -3);
    assert_eq!(ctx.info().unwrap().serial, SERIAL);
}

#[test]
fn garbled_sdtid_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token.sdtid");
    fs::write(&path, "<?xml version=\"1.0\"?>\n<TKNBatch><TKNHeader></TKNBatch>\n").unwrap();

    let mut ctx = TokenContext::new();
    let err = ctx.import_file(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    assert!(ctx.info().is_none());
}

#[test]
fn sdtid_export_imports_from_file() {
    let source = seeded_context([0x42; 16], 60);
    let xml = source
        .token()
        .unwrap()
        .encode_sdtid(None, Some("batchpass"), None)
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token.sdtid");
    fs::write(&path, &xml).unwrap();

    let mut ctx = TokenContext::new();
    ctx.import_file(&path).unwrap();
    assert_eq!(ctx.info().unwrap().serial, SERIAL);
    assert!(ctx.pass_required());

    ctx.decrypt_seed(Some("batchpass"), None).unwrap();
    assert_eq!(
        ctx.compute_tokencode(AT, None).unwrap(),
        source.compute_tokencode(AT, None).unwrap()
    );
}

#[test]
fn issued_sdtid_is_usable() {
    let xml = Token::issue_sdtid(None, None, None).unwrap();

    let mut ctx = TokenContext::new();
    ctx.import_string(&xml).unwrap();
    assert!(!ctx.pass_required());
    // new batches default to AddPIN
    assert!(ctx.pin_required());
    ctx.decrypt_seed(None, None).unwrap();
    assert_eq!(ctx.compute_tokencode(AT, Some("1234")).unwrap().len(), 8);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn encrypt_import_decrypt_round_trip(
        seed in any::<[u8; 16]>(),
        pass in proptest::option::of("[a-zA-Z0-9]{1,40}"),
        devid in proptest::option::of("[0-9A-F]{32}"),
    ) {
        let source = seeded_context(seed, 60);
        let token = source.encrypt_seed(pass.as_deref(), devid.as_deref()).unwrap();

        let mut ctx = TokenContext::new();
        ctx.import_string(&token).unwrap();
        prop_assert_eq!(ctx.pass_required(), pass.is_some());
        prop_assert_eq!(ctx.devid_required(), devid.is_some());

        ctx.decrypt_seed(pass.as_deref(), devid.as_deref()).unwrap();
        let expected = Seed::from_bytes(seed);
        prop_assert_eq!(ctx.seed(), Some(&expected));
        prop_assert_eq!(
            ctx.compute_tokencode(AT, None).unwrap(),
            source.compute_tokencode(AT, None).unwrap()
        );
    }
}
