use anyhow::Result;
use std::io::{stdout, Write};

use stoken::guid_list;

pub fn list_guids() -> Result<()> {
    let stdout = stdout();
    let mut stdout = stdout.lock();

    for class in guid_list() {
        writeln!(stdout, "{:<8} {:<16} {}", class.tag, class.long_name, class.guid)?;
    }
    stdout.flush()?;

    Ok(())
}
