// Copyright (c) 2018 Fabian Schuiki
#[macro_use]
extern crate clap;
extern crate cyk;
#[macro_use]
extern crate log;
extern crate memmap;
extern crate stderrlog;

use std::fs::File;
use std::process;
use std::str;

use clap::{App, Arg, ArgMatches};
use memmap::Mmap;
use cyk::analysis::Analysis;
use cyk::chart::ChartParser;
use cyk::desc;

fn main() {
    let matches = App::new(crate_name!())
        .version(crate_version!())
        .author(crate_authors!())
        .about(crate_description!())
        .arg(
            Arg::with_name("verbosity")
                .short("v")
                .multiple(true)
                .help("Increase message verbosity"),
        )
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .help("Silence all log messages"),
        )
        .arg(
            Arg::with_name("start")
                .long("start")
                .takes_value(true)
                .value_name("NONTERMINAL")
                .help("Start symbol, overriding the one of the grammar description"),
        )
        .arg(
            Arg::with_name("tokens")
                .long("tokens")
                .help("Split inputs at whitespace instead of into characters"),
        )
        .arg(
            Arg::with_name("table")
                .long("table")
                .help("Print the non-empty cells of the chart"),
        )
        .arg(
            Arg::with_name("forest")
                .long("forest")
                .help("Print statistics of the derivation forest"),
        )
        .arg(
            Arg::with_name("GRAMMAR")
                .help("Grammar description file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("INPUT")
                .help("Inputs to parse")
                .multiple(true)
                .index(2),
        )
        .get_matches();

    if let Err(err) = stderrlog::new()
        .module(module_path!())
        .quiet(matches.is_present("quiet"))
        .verbosity(matches.occurrences_of("verbosity") as usize)
        .init()
    {
        eprintln!("unable to initialize logging: {}", err);
    }

    if let Err(msg) = run(&matches) {
        error!("{}", msg);
        process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<(), String> {
    let path = matches.value_of("GRAMMAR").unwrap_or_default();
    let file = File::open(path).map_err(|e| format!("unable to open {}: {}", path, e))?;
    let len = file
        .metadata()
        .map_err(|e| format!("unable to stat {}: {}", path, e))?
        .len();

    // Mapping an empty file fails, so treat it as an empty description.
    let map = if len > 0 {
        Some(unsafe { Mmap::map(&file) }.map_err(|e| format!("unable to map {}: {}", path, e))?)
    } else {
        None
    };
    let text = match map {
        Some(ref map) => str::from_utf8(map).map_err(|e| format!("{} is not UTF-8: {}", path, e))?,
        None => "",
    };
    let description = desc::parse(text).map_err(|e| format!("{}: {}", path, e))?;
    let grammar = &description.grammar;
    debug!(
        "loaded {} rules over {} nonterminals and {} terminals",
        grammar.rules().count(),
        grammar.nonterminal_id_bound(),
        grammar.terminal_id_bound()
    );

    let start = match matches.value_of("start") {
        Some(name) => {
            let id = grammar.nonterminal(name);
            if id.is_none() {
                warn!("start symbol `{}` does not occur in the grammar", name);
            }
            id
        }
        None => description.start,
    };

    if let Some(start) = start {
        let analysis = Analysis::compute(grammar, start);
        for id in analysis.useless() {
            if !analysis.is_productive(id) {
                warn!("nonterminal `{}` derives no terminal string", id.pretty(grammar));
            }
            if !analysis.is_reachable(id) {
                warn!(
                    "nonterminal `{}` is unreachable from `{}`",
                    id.pretty(grammar),
                    start.pretty(grammar)
                );
            }
        }
    } else {
        warn!("no start symbol, all inputs will be rejected");
    }

    let parser = ChartParser::new(grammar);
    for input in matches.values_of("INPUT").into_iter().flat_map(|v| v) {
        let chart = if matches.is_present("tokens") {
            parser.parse(&input.split_whitespace().collect::<Vec<_>>())
        } else {
            parser.parse_chars(input)
        };
        let accepted = start.map_or(false, |s| chart.accepts(s));
        println!(
            "{:?}: {}",
            input,
            if accepted { "ACCEPTED" } else { "REJECTED" }
        );
        if matches.is_present("table") {
            println!("{}", chart.pretty());
        }
        if matches.is_present("forest") {
            match start.and_then(|s| chart.forest(s)) {
                Some(forest) => println!(
                    "forest: {} nodes, {} trees{}",
                    forest.len(),
                    forest.tree_count(),
                    if forest.is_ambiguous() { ", ambiguous" } else { "" }
                ),
                None => println!("forest: none"),
            }
        }
    }
    Ok(())
}
