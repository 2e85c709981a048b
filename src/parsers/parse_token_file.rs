use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use tracing::debug;

use super::parse_token_string;
use crate::error::{Result, TokenError};
use crate::types::Token;

fn read_input_file(path: &Path) -> Result<Vec<u8>> {
    let mut file = File::open(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => TokenError::NotFound(path.to_path_buf()),
        _ => err.into(),
    })?;

    let len = file.metadata()?.len() as usize;
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| TokenError::OutOfMemory)?;
    file.read_to_end(&mut data)?;
    Ok(data)
}

/// Tries every line of the file in turn until one holds a recognizable token.
pub fn parse_token_file(path: &Path) -> Result<Token> {
    let raw = read_input_file(path)?;
    // token text is ASCII; stray bytes elsewhere in the file don't matter
    let data = String::from_utf8_lossy(&raw);

    let mut offset = 0;
    while offset < data.len() {
        match parse_token_string(&data[offset..]) {
            Err(TokenError::UnrecognizedFormat) => {}
            result => return result,
        }
        match data[offset..].find('\n') {
            Some(nl) => offset += nl + 1,
            None => break,
        }
    }

    debug!(path = %path.display(), "no token found in file");
    Err(TokenError::UnrecognizedFormat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn tolerates_non_utf8_lines() {
        let token = crate::Token::random().unwrap();
        let encoded = token.encode(None, None, 2, false).unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"# caf\xe9 export\n").unwrap();
        writeln!(file, "{encoded}").unwrap();

        assert_eq!(parse_token_file(file.path()).unwrap().serial, token.serial);
    }

    #[test]
    fn skips_leading_noise() {
        let token = crate::Token::random().unwrap();
        let encoded = token.encode(None, None, 2, false).unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# exported tokens").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "{encoded}").unwrap();

        assert_eq!(parse_token_file(file.path()).unwrap().serial, token.serial);
    }

    #[test]
    fn stops_at_the_first_real_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "junk").unwrap();
        writeln!(file, "2123").unwrap();
        assert!(matches!(
            parse_token_file(file.path()),
            Err(TokenError::BadLength)
        ));
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_token_file(&dir.path().join("nope")).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::NotFound);
    }
}
