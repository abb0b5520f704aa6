// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::utils::{SETTING_KEYS, Settings, pretty_table, set_setting};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("get", sub)) => {
            let settings = Settings::load(conn)?;
            match sub.get_one::<String>("key") {
                Some(key) => match settings.get(key) {
                    Some(v) => println!("{}", v),
                    None => anyhow::bail!(
                        "Unknown setting '{}' (known: {})",
                        key,
                        SETTING_KEYS.join(", ")
                    ),
                },
                None => {
                    let rows = SETTING_KEYS
                        .iter()
                        .map(|k| vec![k.to_string(), settings.get(k).unwrap_or_default()])
                        .collect();
                    println!("{}", pretty_table(&["Key", "Value"], rows));
                }
            }
        }
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").unwrap();
            let value = sub.get_one::<String>("value").unwrap();
            set_setting(conn, key, value)?;
            println!("{} = {}", key, value);
        }
        _ => {}
    }
    Ok(())
}
