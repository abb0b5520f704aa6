// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::fx::{FavoritesView, RateType};
use crate::store::SqliteFavorites;
use crate::utils::{Settings, maybe_print_json, parse_currency, pretty_table};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let settings = Settings::load(conn)?;
    let store = SqliteFavorites::new(conn);
    let mut view = FavoritesView::load(&store, &settings.user)?;
    match m.subcommand() {
        Some(("list", sub)) => list(&view, sub)?,
        Some(("toggle", sub)) => {
            let currency = parse_currency(sub.get_one::<String>("currency").unwrap())?;
            let rate_type: RateType = sub.get_one::<String>("type").unwrap().parse()?;
            let added = view
                .toggle_with(&store, &currency, &rate_type)
                .context("Favorite not changed")?;
            if added {
                println!("Pinned {} {}", currency, rate_type);
            } else {
                println!("Unpinned {} {}", currency, rate_type);
            }
        }
        Some(("move", sub)) => {
            let from = *sub.get_one::<usize>("from").unwrap();
            let to = *sub.get_one::<usize>("to").unwrap();
            if from == 0 || to == 0 {
                anyhow::bail!("Positions are 1-based");
            }
            view.move_with(&store, from - 1, to - 1)
                .context("Favorites order not changed")?;
            print_marks(&view);
        }
        Some(("reorder", sub)) => {
            let ids: Vec<i64> = sub.get_many::<i64>("ids").unwrap().copied().collect();
            view.reorder_with(&store, &ids)
                .context("Favorites order not changed")?;
            print_marks(&view);
        }
        _ => {}
    }
    Ok(())
}

fn list(view: &FavoritesView, sub: &clap::ArgMatches) -> Result<()> {
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &view.marks())? {
        print_marks(view);
    }
    Ok(())
}

fn print_marks(view: &FavoritesView) {
    let rows = view
        .marks()
        .iter()
        .map(|m| {
            vec![
                (m.position + 1).to_string(),
                m.id.to_string(),
                m.currency.to_string(),
                m.rate_type.label(),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["#", "Id", "Currency", "Type"], rows));
}
