use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{Datelike, NaiveDate};
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::constants::{AES_BLOCK_SIZE, AES_KEY_SIZE, SECURID_EPOCH_DAYS, SERIAL_CHARS};
use crate::crypto::{aes128_ecb_encrypt, cbc_hash, copy_truncated, ct_eq, xor_block};
use crate::error::{Result, TokenError};
use crate::types::{Seed, Token, TokenFlags, TokenRecord};

const BATCH_MAC_IV: [u8; AES_BLOCK_SIZE] = [
    0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf, 0x4f, 0x3c,
];
const TOKEN_MAC_IV: [u8; AES_BLOCK_SIZE] = [
    0x1b, 0xb6, 0x7a, 0xe8, 0x58, 0x4c, 0xaa, 0x73, 0xb2, 0x57, 0x42, 0xd7, 0x07, 0x8b, 0x83, 0xb8,
];
const TOKEN_ENC_IV: [u8; AES_BLOCK_SIZE] = [
    0x16, 0xa0, 0x9e, 0x66, 0x7f, 0x3b, 0xcc, 0x90, 0x8b, 0x2f, 0xb1, 0x36, 0x6e, 0xa9, 0x57, 0xd3,
];

const MAX_HASH_DATA: usize = 65536;
const PASSWORD_ROUNDS: u16 = 1000;
/// chrono counts days from 0001/01/01; this is 1970/01/01.
const UNIX_EPOCH_DAYS_FROM_CE: i64 = 719_163;

/// Element of a parsed XML tree. Only element children are kept.
#[derive(Clone, Debug, Default)]
pub(crate) struct XmlNode {
    pub name: String,
    pub text: String,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Depth-first search that looks inside each child before the child itself.
    fn find(&self, name: &str) -> Option<&XmlNode> {
        for child in &self.children {
            if let Some(found) = child.find(name) {
                return Some(found);
            }
            if child.name == name {
                return Some(child);
            }
        }
        None
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut XmlNode> {
        let idx = self.children.iter().position(|child| {
            child.find(name).is_some() || child.name == name
        })?;
        let child = &mut self.children[idx];
        if child.find(name).is_some() {
            child.find_mut(name)
        } else {
            Some(child)
        }
    }

    fn content(&self) -> String {
        let mut out = self.text.clone();
        for child in &self.children {
            out.push_str(&child.content());
        }
        out
    }

    pub(crate) fn leaf(name: &str, value: &str) -> XmlNode {
        XmlNode {
            name: name.to_owned(),
            text: value.to_owned(),
            children: Vec::new(),
        }
    }

    /// Replaces the content of the first `name` element below this one, or
    /// appends a new `name` element when there is none.
    pub(crate) fn set_value(&mut self, name: &str, value: &str) {
        match self.find_mut(name) {
            Some(node) => {
                node.text = value.to_owned();
                node.children.clear();
            }
            None => self.children.push(XmlNode::leaf(name, value)),
        }
    }

    /// Pretty-prints the element, one child per line.
    fn write_xml(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        if !self.children.is_empty() {
            out.push_str(&format!("{indent}<{}>\n", self.name));
            for child in &self.children {
                child.write_xml(out, depth + 1);
            }
            out.push_str(&format!("{indent}</{}>\n", self.name));
        } else if self.text.is_empty() {
            out.push_str(&format!("{indent}<{}/>\n", self.name));
        } else {
            let text = escape(self.text.as_str());
            out.push_str(&format!("{indent}<{0}>{text}</{0}>\n", self.name));
        }
    }
}

pub(crate) fn parse_xml(input: &str) -> Result<XmlNode> {
    let mut reader = Reader::from_str(input);
    let mut stack: Vec<XmlNode> = Vec::new();

    let new_node = |name: &[u8]| -> Result<XmlNode> {
        let name = std::str::from_utf8(name).map_err(|err| TokenError::Xml(err.to_string()))?;
        Ok(XmlNode {
            name: name.to_owned(),
            ..Default::default()
        })
    };

    loop {
        let event = reader
            .read_event()
            .map_err(|err| TokenError::Xml(err.to_string()))?;
        match event {
            Event::Start(e) => stack.push(new_node(e.name().as_ref())?),
            Event::Empty(e) => {
                let node = new_node(e.name().as_ref())?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => return Ok(node),
                }
            }
            Event::Text(t) => {
                if let Some(node) = stack.last_mut() {
                    let text = t.unescape().map_err(|err| TokenError::Xml(err.to_string()))?;
                    node.text.push_str(&text);
                }
            }
            Event::CData(c) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| TokenError::Xml("unbalanced end tag".into()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => return Ok(node),
                }
            }
            Event::Eof => return Err(TokenError::Xml("unexpected end of document".into())),
            _ => {}
        }
    }
}

/// Parsed `<TKNBatch>` holding exactly one token.
#[derive(Clone, Debug)]
pub(crate) struct SdtidRecord {
    pub header: XmlNode,
    pub token: XmlNode,
    pub trailer: XmlNode,
}

pub(crate) struct SdtidKeys {
    serial: String,
    batch_mac: Zeroizing<[u8; AES_KEY_SIZE]>,
    token_mac: Zeroizing<[u8; AES_KEY_SIZE]>,
    token_enc: Zeroizing<[u8; AES_KEY_SIZE]>,
}

fn missing(name: &str) -> TokenError {
    TokenError::SdtidField(name.to_owned())
}

/// Decimal, `0x` hex or leading-zero octal integer; the whole string must parse.
fn parse_radix_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let value = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()?
    } else if s.len() > 1 && s.starts_with('0') {
        i64::from_str_radix(&s[1..], 8).ok()?
    } else {
        s.parse::<i64>().ok()?
    };
    Some(if negative { -value } else { value })
}

/// "Y/M/D" to days since 2000/01/01, zero when unparsable.
fn parse_date(raw: &str) -> u16 {
    let mut parts = raw.trim().splitn(3, '/').map(|p| p.trim().parse::<i64>().ok());
    let (Some(Some(year)), Some(Some(month)), Some(Some(day))) =
        (parts.next(), parts.next(), parts.next())
    else {
        return 0;
    };
    let date = i32::try_from(year)
        .ok()
        .zip(u32::try_from(month).ok())
        .zip(u32::try_from(day).ok())
        .and_then(|((y, m), d)| NaiveDate::from_ymd_opt(y, m, d));
    match date {
        Some(date) => {
            let days =
                i64::from(date.num_days_from_ce()) - UNIX_EPOCH_DAYS_FROM_CE - SECURID_EPOCH_DAYS;
            u16::try_from(days).unwrap_or(0)
        }
        None => 0,
    }
}

fn hash_password(pass: &str, dest: &str, name: &str) -> Zeroizing<[u8; AES_KEY_SIZE]> {
    let mut key = Zeroizing::new([0u8; AES_KEY_SIZE]);
    copy_truncated(&mut key[..], name.as_bytes());

    let mut data = Zeroizing::new([0u8; 0x50]);
    copy_truncated(&mut data[..0x20], pass.as_bytes());
    copy_truncated(&mut data[0x20..0x40], dest.as_bytes());

    let mut result = Zeroizing::new([0u8; AES_BLOCK_SIZE]);
    for i in 0..PASSWORD_ROUNDS {
        data[0x4e..0x50].copy_from_slice(&i.to_be_bytes());
        let tmp = cbc_hash(&key, &[0u8; AES_BLOCK_SIZE], &data[..]);
        xor_block(&mut result, &tmp);
    }
    result
}

/// AES-encrypts `str0 ‖ str1` (8 bytes each) and xors the ciphertext into `data`.
fn unmask_block(
    data: &[u8; AES_BLOCK_SIZE],
    str0: &str,
    str1: &str,
    key: &[u8; AES_KEY_SIZE],
) -> [u8; AES_BLOCK_SIZE] {
    let mut block = [0u8; AES_BLOCK_SIZE];
    copy_truncated(&mut block[..8], str0.as_bytes());
    copy_truncated(&mut block[8..], str1.as_bytes());
    let mut out = aes128_ecb_encrypt(key, &block);
    xor_block(&mut out, data);
    out
}

fn calc_key(
    str0: &str,
    str1: &str,
    key: &[u8; AES_KEY_SIZE],
    iv: &[u8; AES_BLOCK_SIZE],
) -> Zeroizing<[u8; AES_KEY_SIZE]> {
    let mut buf = [0u8; 0x40];
    copy_truncated(&mut buf[..0x20], str0.as_bytes());
    copy_truncated(&mut buf[0x20..], str1.as_bytes());
    Zeroizing::new(cbc_hash(key, iv, &buf))
}

#[derive(Default)]
struct HashState {
    data: Vec<u8>,
    padding: usize,
    /// Signing input keeps `*MAC` elements and never pads.
    signing: bool,
}

impl HashState {
    fn for_signing() -> Self {
        HashState {
            signing: true,
            ..Default::default()
        }
    }

    /// Serializes leaf elements as "path value\n" lines, skipping `*MAC`
    /// elements unless signing. Returns how many element children `node` has.
    fn hash_children(&mut self, prefix: &str, node: &XmlNode) -> Result<usize> {
        for child in &node.children {
            let name = child.name.as_str();
            if !self.signing && name.len() > 3 && name.ends_with("MAC") {
                continue;
            }

            let longname = format!("{prefix}.{name}");
            if self.hash_children(&longname, child)? > 0 {
                continue;
            }

            let value = child.content();
            let line = if value.is_empty() {
                format!("{longname} </{name}>\n")
            } else {
                format!("{longname} {value}\n")
            };

            let pos = self.data.len();
            let remain = MAX_HASH_DATA.saturating_sub(pos);
            let bytes = line.len();
            if bytes >= remain {
                return Err(TokenError::BadLength);
            }

            // short values overwrite the padding of the previous line
            if !self.signing
                && !value.is_empty()
                && bytes + self.padding <= 16
                && bytes + self.padding < remain
            {
                self.data.truncate(pos & !0xf);
            }
            self.data.extend_from_slice(line.as_bytes());
            self.data.resize(self.data.len() + self.padding, 0);

            if !self.signing {
                self.padding = match self.data.len() & 0xf {
                    0 => 0x10,
                    n => n,
                };
            }
        }
        Ok(node.children.len())
    }
}

fn hash_section(
    node: &XmlNode,
    key: &[u8; AES_KEY_SIZE],
    iv: &[u8; AES_BLOCK_SIZE],
) -> Result<[u8; AES_BLOCK_SIZE]> {
    let mut state = HashState::default();
    state.hash_children(&node.name, node)?;
    Ok(cbc_hash(key, iv, &state.data))
}

impl SdtidRecord {
    pub fn parse(input: &str) -> Result<Self> {
        Self::from_batch(&parse_xml(input)?, true)
    }

    /// Like `parse`, but sections a skeleton file leaves out come back empty.
    pub fn parse_template(input: &str) -> Result<Self> {
        Self::from_batch(&parse_xml(input)?, false)
    }

    fn from_batch(batch: &XmlNode, strict: bool) -> Result<Self> {
        if batch.name != "TKNBatch" {
            return Err(missing("TKNBatch"));
        }

        let mut tokens = batch.children.iter().filter(|c| c.name == "TKN");
        let token = tokens.next().cloned();
        if tokens.next().is_some() {
            return Err(TokenError::MultipleTokens);
        }

        let section = |node: Option<XmlNode>, name: &str| match node {
            Some(node) => Ok(node),
            None if strict => Err(missing(name)),
            None => Ok(XmlNode::leaf(name, "")),
        };
        Ok(SdtidRecord {
            header: section(batch.child("TKNHeader").cloned(), "TKNHeader")?,
            token: section(token, "TKN")?,
            trailer: section(batch.child("TKNTrailer").cloned(), "TKNTrailer")?,
        })
    }

    /// Searches the sections in document order.
    pub fn find_any(&self, name: &str) -> Option<String> {
        [&self.header, &self.token, &self.trailer]
            .into_iter()
            .find_map(|section| section.find(name))
            .map(XmlNode::content)
    }

    pub fn to_xml(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\"?>\n<TKNBatch>\n");
        for section in [&self.header, &self.token, &self.trailer] {
            section.write_xml(&mut out, 1);
        }
        out.push_str("</TKNBatch>\n");
        out
    }

    /// Looks in `<TKN>`, then `Def<name>` and `<name>` in `<TKNHeader>`.
    pub fn lookup(&self, name: &str) -> Option<String> {
        self.token
            .find(name)
            .or_else(|| self.header.find(&format!("Def{name}")))
            .or_else(|| self.header.find(name))
            .map(XmlNode::content)
    }

    fn lookup_int(&self, name: &str, default: i64) -> Result<i64> {
        match self.lookup(name) {
            None => Ok(default),
            Some(raw) => parse_radix_int(&raw).ok_or_else(|| missing(name)),
        }
    }

    fn lookup_trimmed(&self, name: &str) -> Result<String> {
        self.lookup(name)
            .map(|v| v.trim().to_owned())
            .ok_or_else(|| missing(name))
    }

    pub fn lookup_b64(&self, name: &str) -> Result<[u8; AES_BLOCK_SIZE]> {
        let raw = self.lookup(name).ok_or_else(|| missing(name))?;
        let mut data = raw.trim();
        // <Seed> starts with a bogus character
        if name == "Seed" && !data.is_empty() {
            data = &data[data.chars().next().map_or(0, char::len_utf8)..];
        }
        let decoded = STANDARD.decode(data).map_err(|_| missing(name))?;
        decoded.try_into().map_err(|_| missing(name))
    }

    pub fn generate_keys(&self, pass: Option<&str>) -> Result<SdtidKeys> {
        let serial = self.lookup_trimmed("SN")?;
        let origin = self.lookup_trimmed("Origin")?;
        let dest = self.lookup_trimmed("Dest")?;
        let name = self.lookup_trimmed("Name")?;
        let secret = self.lookup_b64("Secret")?;

        let key0 = hash_password(pass.unwrap_or(&origin), &dest, &name);
        let key1 = Zeroizing::new(unmask_block(&secret, "Secret", &name, &key0));

        Ok(SdtidKeys {
            batch_mac: calc_key("BatchMAC", &name, &key1, &BATCH_MAC_IV),
            token_mac: calc_key("TokenMAC", &serial, &key1, &TOKEN_MAC_IV),
            token_enc: calc_key("TokenEncrypt", &serial, &key1, &TOKEN_ENC_IV),
            serial,
        })
    }

    pub fn header_mac(&self, keys: &SdtidKeys) -> Result<[u8; AES_BLOCK_SIZE]> {
        hash_section(&self.header, &keys.batch_mac, &BATCH_MAC_IV)
    }

    pub fn token_mac(&self, keys: &SdtidKeys) -> Result<[u8; AES_BLOCK_SIZE]> {
        hash_section(&self.token, &keys.token_mac, &TOKEN_MAC_IV)
    }

    /// Header and token serialized back to back, MACs included, as covered
    /// by `<BatchSignature>`.
    pub fn signed_data(&self) -> Result<Vec<u8>> {
        let mut state = HashState::for_signing();
        state.hash_children(&self.header.name, &self.header)?;
        state.hash_children(&self.token.name, &self.token)?;
        Ok(state.data)
    }
}

impl SdtidKeys {
    /// Masking is symmetric, so this both encrypts and decrypts a seed.
    pub fn unmask_seed(&self, data: &[u8; AES_BLOCK_SIZE]) -> [u8; AES_BLOCK_SIZE] {
        unmask_block(data, &self.serial, "Seed", &self.token_enc)
    }
}

pub(crate) fn decrypt_sdtid_seed(
    token: &mut Token,
    pass: Option<&str>,
    _devid: Option<&str>,
) -> Result<()> {
    let TokenRecord::Sdtid(record) = &token.record else {
        return Err(TokenError::TokenVersion);
    };

    let keys = record.generate_keys(pass)?;
    let enc_seed = record.lookup_b64("Seed")?;

    let good_header_mac = record.lookup_b64("HeaderMAC")?;
    let header_ok = ct_eq(&record.header_mac(&keys)?, &good_header_mac);
    let good_token_mac = record.lookup_b64("TokenMAC")?;
    let token_ok = ct_eq(&record.token_mac(&keys)?, &good_token_mac);

    // a corrupted <Secret> looks exactly like a wrong password
    match (header_ok, token_ok) {
        (false, false) if pass.is_some() => return Err(TokenError::DecryptFailed),
        (false, false) => return Err(TokenError::MissingPassword),
        (false, true) => {
            warn!("header MAC check failed - malformed input");
            return Err(TokenError::DecryptFailed);
        }
        (true, false) => {
            warn!("token MAC check failed - malformed input");
            return Err(TokenError::DecryptFailed);
        }
        (true, true) => {}
    }

    let seed = Zeroizing::new(keys.unmask_seed(&enc_seed));
    token.enc_seed = Some(enc_seed);
    token.seed = Some(Seed::from_bytes(*seed));
    Ok(())
}

pub(crate) fn decode_sdtid_token(input: &str) -> Result<Token> {
    let record = SdtidRecord::parse(input)?;

    let sn = record.lookup("SN").unwrap_or_default();
    if sn.is_empty() || sn.len() > SERIAL_CHARS || !sn.bytes().all(|b| b.is_ascii_digit()) {
        return Err(missing("SN"));
    }
    // hard token files drop the leading zeroes
    let serial = format!("{sn:0>width$}", width = SERIAL_CHARS);

    let mut flags = TokenFlags::default();
    flags.set(TokenFlags::TIME_DERIVED, record.lookup_int("TimeDerivedSeeds", 0)? != 0);
    flags.set(TokenFlags::APP_DERIVED, record.lookup_int("AppDerivedSeeds", 0)? != 0);
    flags.set(TokenFlags::FEATURE_4, record.lookup_int("Mode", 0)? != 0);
    flags.set(TokenFlags::KEY_128BIT, record.lookup_int("Alg", 0)? != 0);

    let add_pin = u8::from(record.lookup_int("AddPIN", 0)? != 0);
    let local_pin = u8::from(record.lookup_int("LocalPIN", 0)? != 0);
    flags.set_pin_mode((add_pin << 1) | local_pin);

    let digits = record.lookup_int("Digits", 6)?;
    // clamp rather than wrap in the 3-bit field
    flags.set_digits(digits.clamp(1, 8) as usize);
    flags.set_interval(u32::try_from(record.lookup_int("Interval", 60)?).unwrap_or(0));

    let exp_date = parse_date(&record.lookup("Death").unwrap_or_default());
    if exp_date == 0 {
        return Err(missing("Death"));
    }

    let mut token = Token {
        version: 2,
        serial,
        flags,
        exp_date,
        is_smartphone: false,
        enc_seed: None,
        dec_seed_hash: 0,
        device_id_hash: 0,
        seed: None,
        pin: None,
        enc_pin: None,
        record: TokenRecord::Sdtid(Box::new(record)),
    };

    // The device ID is never needed to decrypt sdtid seeds, so only the
    // password flag is derived here.
    match decrypt_sdtid_seed(&mut token, None, None) {
        Ok(()) => {
            token.seed = None;
        }
        Err(TokenError::MissingPassword) => {
            debug!("sdtid token is password protected");
            token.flags.set(TokenFlags::PASSWORD_PROTECTED, true);
            token.enc_seed = record_seed(&token).ok();
        }
        Err(err) => return Err(err),
    }
    Ok(token)
}

fn record_seed(token: &Token) -> Result<[u8; AES_BLOCK_SIZE]> {
    match &token.record {
        TokenRecord::Sdtid(record) => record.lookup_b64("Seed"),
        _ => Err(TokenError::TokenVersion),
    }
}
