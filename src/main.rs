use std::env;
use std::path::PathBuf;

use log::LevelFilter;
use stardict2db::{convert, StarDict, Store};

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut debug = false;
    let mut positional: Vec<&String> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-D" | "--debug" => debug = true,
            _ => positional.push(arg),
        }
    }

    if positional.is_empty() || positional.len() > 2 {
        eprintln!(
            "Usage: {} [-D|--debug] <stardict-directory> [output.db]",
            args[0]
        );
        std::process::exit(1);
    }

    env_logger::Builder::from_default_env()
        .filter_level(if debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();

    let dir = positional[0];

    let dict = match StarDict::open(dir) {
        Ok(dict) => dict,
        Err(e) => {
            eprintln!("ERROR: failed to open dictionary in {}", dir);
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    // Default output: <ifo stem>.db in the current directory.
    let db_path = positional.get(1).map(PathBuf::from).unwrap_or_else(|| {
        let stem = dict
            .files
            .ifo
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dictionary".to_string());
        PathBuf::from(format!("{}.db", stem))
    });

    let result = Store::open(&db_path).and_then(|mut store| convert(&dict, &mut store));
    match result {
        Ok(stats) => {
            println!("Conversion complete: {}", db_path.display());
            println!("  Entries read:       {}", stats.entries);
            println!("  Definitions stored: {}", stats.definitions);
            println!("  Duplicates merged:  {}", stats.duplicates);
            println!("  Word rows written:  {}", stats.word_rows);
            if stats.resolution_collisions > 0 {
                println!(
                    "  Resolution collisions (logged): {}",
                    stats.resolution_collisions
                );
            }
        }
        Err(e) => {
            eprintln!("ERROR: conversion failed");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}
