mod batch_key;

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::{Pkcs1v15Sign, RsaPrivateKey};
use sha1::{Digest, Sha1};
use tracing::debug;
use zeroize::Zeroizing;

use self::batch_key::{BATCH_CERTIFICATE, BATCH_PRIVATE_KEY};
use crate::constants::{AES_BLOCK_SIZE, AES_KEY_SIZE, SECURID_EPOCH};
use crate::crypto::random_bytes;
use crate::error::{Result, TokenError};
use crate::parsers::{SdtidRecord, XmlNode};
use crate::types::{Seed, Token, TokenFlags};

const DAY_SECS: i64 = 24 * 60 * 60;
/// Issued tokens without a `<Death>` expire five years out.
const ISSUE_LIFETIME_SECS: i64 = 5 * 365 * DAY_SECS;

type Fields = &'static [(&'static str, Option<&'static str>)];

const HEADER_FIELDS: Fields = &[
    ("Version", Some("0")),
    ("Origin", Some("N/A")),
    ("Dest", Some("N/A")),
    ("Name", Some("N/A")),
    ("FirstToken", Some("N/A")),
    ("LastToken", Some("N/A")),
    ("NumTokens", Some("0")),
    ("Secret", Some(" ")),
    ("DefBirth", Some("2000/01/01")),
    ("DefDeath", Some(" ")),
    ("DefDigits", Some("8")),
    ("DefInterval", Some("60")),
    ("DefAlg", Some("1")),
    ("DefMode", Some("0")),
    ("DefPrecision", Some("2400")),
    ("DefSmallWin", Some("630")),
    ("DefMediumWin", Some("4320")),
    ("DefLargeWin", Some("4320")),
    ("DefAddPIN", Some("1")),
    ("DefLocalPIN", Some("0")),
    ("DefCopyProtection", Some("1")),
    ("DefPinType", Some("0")),
    ("DefKeypad", Some("1")),
    ("DefProtLevel", Some("0")),
    ("DefRevision", Some("0")),
    ("DefTimeDerivedSeeds", Some("1")),
    ("DefAppDerivedSeeds", Some("0")),
    ("DefFormFactor", Some("20000001")),
];

// per-token values are normally left to the header defaults
const TOKEN_FIELDS: Fields = &[
    ("SN", Some(" ")),
    ("Seed", Some(" ")),
    ("UserFirstName", Some(" ")),
    ("UserLastName", Some(" ")),
    ("UserLogin", Some(" ")),
    ("Birth", None),
    ("Death", None),
    ("Digits", None),
    ("Interval", None),
    ("Alg", None),
    ("Mode", None),
    ("Precision", None),
    ("SmallWin", None),
    ("MediumWin", None),
    ("LargeWin", None),
    ("AddPIN", None),
    ("LocalPIN", None),
    ("CopyProtection", None),
    ("PinType", None),
    ("Keypad", None),
    ("ProtLevel", None),
    ("Revision", None),
    ("TimeDerivedSeeds", None),
    ("AppDerivedSeeds", None),
    ("FormFactor", None),
];

const TOKEN_ATTR_FIELDS: Fields = &[("DeviceSerialNumber", Some(" ")), ("Nickname", Some(" "))];

const TRAILER_FIELDS: Fields = &[("BatchSignature", Some(" ")), ("BatchCertificate", Some(" "))];

/// Template values win over the built-in defaults; fields with neither are left out.
fn fill_section(name: &str, fields: Fields, template: Option<&SdtidRecord>) -> XmlNode {
    let mut section = XmlNode::leaf(name, "");
    for &(field, default) in fields {
        let value = template
            .and_then(|tpl| tpl.find_any(field))
            .or_else(|| default.map(str::to_owned));
        if let Some(value) = value {
            section.children.push(XmlNode::leaf(field, &value));
        }
    }
    section
}

fn format_date(unix: i64) -> String {
    DateTime::<Utc>::from_timestamp(unix, 0)
        .map(|d| d.format("%Y/%m/%d").to_string())
        .unwrap_or_default()
}

fn death_date(exp_date: u16) -> i64 {
    SECURID_EPOCH + i64::from(exp_date) * DAY_SECS
}

/// Twelve digits, two from each random byte.
fn random_serial() -> Result<String> {
    let rand: [u8; 6] = random_bytes()?;
    Ok(rand.iter().map(|b| format!("{:02}", b % 100)).collect())
}

fn sign_batch(data: &[u8]) -> Result<Vec<u8>> {
    let key = RsaPrivateKey::from_pkcs1_der(&BATCH_PRIVATE_KEY)
        .map_err(|err| TokenError::Signature(err.to_string()))?;
    let digest = Sha1::digest(data);
    key.sign(Pkcs1v15Sign::new::<Sha1>(), &digest)
        .map_err(|err| TokenError::Signature(err.to_string()))
}

/// A single-token `<TKNBatch>` under construction, optionally seeded from a
/// skeleton file whose values take precedence.
struct SdtidBuilder {
    record: SdtidRecord,
    template: Option<SdtidRecord>,
}

impl SdtidBuilder {
    fn new(template: Option<&str>) -> Result<Self> {
        let template = template.map(SdtidRecord::parse_template).transpose()?;
        let tpl = template.as_ref();

        let mut token = fill_section("TKN", TOKEN_FIELDS, tpl);
        token
            .children
            .push(fill_section("TokenAttributes", TOKEN_ATTR_FIELDS, tpl));

        let record = SdtidRecord {
            header: fill_section("TKNHeader", HEADER_FIELDS, tpl),
            token,
            trailer: fill_section("TKNTrailer", TRAILER_FIELDS, tpl),
        };
        Ok(SdtidBuilder { record, template })
    }

    fn in_template(&self, name: &str) -> bool {
        self.template
            .as_ref()
            .is_some_and(|tpl| tpl.lookup(name).is_some())
    }

    /// Stores `Def<name>` in the header unless the template sets `name`.
    fn store_default(&mut self, name: &str, value: i64) {
        if !self.in_template(name) {
            self.record
                .header
                .set_value(&format!("Def{name}"), &value.to_string());
        }
    }

    fn randomize_secret(&mut self) -> Result<()> {
        let secret: [u8; AES_BLOCK_SIZE] = random_bytes()?;
        self.record.header.set_value("Secret", &STANDARD.encode(secret));
        Ok(())
    }

    fn set_devid(&mut self, devid: Option<&str>) {
        if let Some(devid) = devid {
            self.record.token.set_value("DeviceSerialNumber", devid);
        }
    }

    /// Masks `seed` under the batch keys, recomputes both MACs and signs the
    /// trailer.
    fn seal(mut self, seed: &[u8; AES_KEY_SIZE], pass: Option<&str>) -> Result<String> {
        let keys = self.record.generate_keys(pass)?;
        let enc_seed = keys.unmask_seed(seed);
        // readers skip the first character of <Seed>
        self.record
            .token
            .set_value("Seed", &format!("={}", STANDARD.encode(enc_seed)));

        let header_mac = self.record.header_mac(&keys)?;
        self.record
            .header
            .set_value("HeaderMAC", &STANDARD.encode(header_mac));
        let token_mac = self.record.token_mac(&keys)?;
        self.record
            .token
            .set_value("TokenMAC", &STANDARD.encode(token_mac));

        let signature = sign_batch(&self.record.signed_data()?)?;
        self.record
            .trailer
            .set_value("BatchSignature", &STANDARD.encode(signature));
        self.record
            .trailer
            .set_value("BatchCertificate", &STANDARD.encode(BATCH_CERTIFICATE));

        Ok(self.record.to_xml())
    }
}

/// Writes `token` as an sdtid file. A template `<Seed>` holds a plain seed
/// that replaces the token's own.
pub(crate) fn encode_sdtid_token(
    token: &Token,
    seed: &Seed,
    template: Option<&str>,
    pass: Option<&str>,
    devid: Option<&str>,
) -> Result<String> {
    let mut batch = SdtidBuilder::new(template)?;
    if !batch.in_template("Secret") {
        batch.randomize_secret()?;
    }
    if !batch.in_template("SN") {
        batch.record.token.set_value("SN", &token.serial);
    }

    let flags = token.flags;
    let flag = |bit: TokenFlags| i64::from(flags.contains(bit));
    batch.store_default("TimeDerivedSeeds", flag(TokenFlags::TIME_DERIVED));
    batch.store_default("AppDerivedSeeds", flag(TokenFlags::APP_DERIVED));
    batch.store_default("Mode", flag(TokenFlags::FEATURE_4));
    batch.store_default("Alg", flag(TokenFlags::KEY_128BIT));
    batch.store_default("AddPIN", i64::from(flags.pin_mode() & 0x2 != 0));
    batch.store_default("LocalPIN", i64::from(flags.pin_mode() & 0x1 != 0));
    batch.store_default("Digits", flags.digits() as i64);
    batch.store_default("Interval", i64::from(flags.interval()));

    if !batch.in_template("Death") {
        batch
            .record
            .header
            .set_value("DefDeath", &format_date(death_date(token.exp_date)));
    }
    batch.set_devid(devid);

    let seed = match &batch.template {
        Some(tpl) if batch.in_template("Seed") => {
            debug!("using the plain seed from the template");
            Zeroizing::new(tpl.lookup_b64("Seed")?)
        }
        _ => Zeroizing::new(*seed.as_bytes()),
    };
    batch.seal(&seed, pass)
}

/// Creates a new sdtid file around a random seed and secret.
pub(crate) fn issue_sdtid_token(
    template: Option<&str>,
    pass: Option<&str>,
    devid: Option<&str>,
) -> Result<String> {
    let mut batch = SdtidBuilder::new(template)?;
    batch.randomize_secret()?;
    let seed = Seed::random()?;

    if !batch.in_template("SN") {
        batch.record.token.set_value("SN", &random_serial()?);
    }
    batch.set_devid(devid);

    let now = Utc::now().timestamp();
    if !batch.in_template("Birth") {
        batch.record.header.set_value("DefBirth", &format_date(now));
    }
    if !batch.in_template("Death") {
        batch
            .record
            .header
            .set_value("DefDeath", &format_date(now + ISSUE_LIFETIME_SECS));
    }

    batch.seal(seed.as_bytes(), pass)
}
