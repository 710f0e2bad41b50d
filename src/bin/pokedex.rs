// Command-line front end for the Pokedex catalog store

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Duration;

use pokedex::{
    config::{CliArgs, Command, Config},
    debounce::SearchInput,
    detail::{load_details, load_favorites, PokemonDetails},
    format,
    gateway::{HttpGateway, PokemonGateway},
    preferences::Preferences,
    store::{CatalogState, CatalogStore},
    types::{Pokemon, PokemonType},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (safe to ignore if not found)
    let _ = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = CliArgs::parse();
    let cfg = Config::from_args(&args).context("Failed to load configuration")?;
    let command = args.command.clone().unwrap_or_default();
    log::debug!("{cfg:?} {command:?}");

    let gateway: Arc<dyn PokemonGateway> = Arc::new(HttpGateway::new(cfg.base_url.clone())?);
    let preferences = Preferences::start(&cfg.db_path)?;
    let store = Arc::new(CatalogStore::open(gateway, preferences).await);

    let outcome = run(&cfg, &store, command).await;

    // Make sure favorite/theme writes land before exit
    store.preferences().flush().await;
    outcome
}

async fn run(cfg: &Config, store: &Arc<CatalogStore>, command: Command) -> Result<()> {
    match command {
        Command::List { page, kind } => {
            store.fetch_page(page).await;
            if kind.is_some() {
                store.filter_by_type(kind);
            }
            print_state(&store.snapshot());
        }
        Command::Search { query } => {
            store.search(&query).await;
            print_state(&store.snapshot());
        }
        Command::Show { key } => {
            let details = load_details(store.gateway().as_ref(), key.as_str()).await?;
            print_details(&details, store.is_favorite(details.pokemon.id));
        }
        Command::Favorite { id } => {
            if store.toggle_favorite(id) {
                println!("#{} added to favorites", format::pokemon_id(id));
            } else {
                println!("#{} removed from favorites", format::pokemon_id(id));
            }
        }
        Command::Favorites => {
            let favorites = load_favorites(store).await?;
            if favorites.is_empty() {
                println!("You haven't added any Pokémon to your favorites yet.");
            } else {
                for p in &favorites {
                    print_card(p, true);
                }
            }
        }
        Command::Theme => {
            let dark = store.toggle_dark_mode();
            println!("Dark mode {}", if dark { "on" } else { "off" });
        }
        Command::Browse => {
            cfg.print_summary();
            browse(store, Duration::from_millis(cfg.debounce_ms)).await?;
        }
    }
    Ok(())
}

/// Line-driven session. `/text` types into the search box (debounced),
/// `!text` submits it, `n`/`p`/`g N` paginate, `t TYPE` filters, `f ID`
/// toggles a favorite, `d` toggles dark mode, `s KEY` shows a record.
async fn browse(store: &Arc<CatalogStore>, debounce: Duration) -> Result<()> {
    let input = SearchInput::spawn(Arc::clone(store), debounce);

    let mut updates = store.subscribe();
    let renderer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            if !state.loading {
                print_state(&state);
            }
        }
    });

    store.fetch_page(1).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim_end();
        let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
        let state = store.snapshot();

        match cmd {
            "q" | "quit" => break,
            "n" => match state.next_page() {
                Some(page) => store.fetch_page(page).await,
                None => eprintln!("already on the last page"),
            },
            "p" => match state.prev_page() {
                Some(page) => store.fetch_page(page).await,
                None => eprintln!("already on the first page"),
            },
            "g" => match rest.trim().parse::<u32>() {
                Ok(page) => store.fetch_page(page).await,
                Err(_) => eprintln!("usage: g <page>"),
            },
            "t" if rest.trim().is_empty() => store.filter_by_type(None),
            "t" => match rest.parse::<PokemonType>() {
                Ok(ty) => store.filter_by_type(Some(ty)),
                Err(e) => eprintln!("{e}"),
            },
            "f" => match rest.trim().parse::<u32>() {
                Ok(id) => {
                    store.toggle_favorite(id);
                }
                Err(_) => eprintln!("usage: f <id>"),
            },
            "d" => {
                store.toggle_dark_mode();
            }
            "s" => match load_details(store.gateway().as_ref(), rest).await {
                Ok(details) => print_details(&details, store.is_favorite(details.pokemon.id)),
                Err(e) => eprintln!("{e}"),
            },
            _ if line.starts_with('/') => input.set_text(&line[1..]),
            _ if line.starts_with('!') => input.submit(&line[1..]),
            "" => {}
            other => eprintln!("unknown command '{other}'"),
        }
    }

    drop(input);
    renderer.abort();
    Ok(())
}

fn print_state(state: &CatalogState) {
    if let Some(err) = &state.error {
        eprintln!("error: {err}");
        return;
    }

    let mut header = format!("Page {}/{}", state.current_page, state.total_pages);
    if let Some(ty) = state.selected_type {
        header.push_str(&format!("  type:{ty}"));
    }
    if !state.search_query.trim().is_empty() {
        header.push_str(&format!("  search:\"{}\"", state.search_query));
    }
    if state.dark_mode {
        header.push_str("  [dark]");
    }
    println!("{header}");

    if state.filtered.is_empty() {
        println!("  No Pokémon found.");
    }
    for p in &state.filtered {
        print_card(p, state.is_favorite(p.id));
    }
}

fn print_card(p: &Pokemon, favorite: bool) {
    let types: Vec<String> = p
        .types
        .iter()
        .map(|t| format!("{}({})", t.kind.name, format::type_color(&t.kind.name)))
        .collect();
    println!(
        "  {} #{} {:<14} {}",
        if favorite { "♥" } else { " " },
        format::pokemon_id(p.id),
        p.name,
        types.join(" ")
    );
}

fn print_details(details: &PokemonDetails, favorite: bool) {
    let p = &details.pokemon;
    println!(
        "#{} {}{}",
        format::pokemon_id(p.id),
        p.name,
        if favorite { "  ♥" } else { "" }
    );
    if let Some(url) = p.sprites.preferred() {
        println!("  {url}");
    }
    println!("  {}", details.description());
    println!(
        "  Height {}  Weight {}",
        format::height(p.height),
        format::weight(p.weight)
    );
    println!(
        "  Category {}  Generation {}",
        details.category(),
        details.generation()
    );

    println!("Stats");
    for s in &p.stats {
        println!(
            "  {:<8} {:>3} {:>5.1}%",
            format::stat_name(&s.stat.name),
            s.base_stat,
            format::stat_bar_percent(s.base_stat)
        );
    }

    println!("Abilities");
    for a in &p.abilities {
        println!(
            "  {}{}",
            format::ability_name(&a.ability.name),
            if a.is_hidden { " (hidden)" } else { "" }
        );
    }

    let rows = details.evolution_rows();
    if !rows.is_empty() {
        println!("Evolution chain");
        for row in rows {
            let indent = "  ".repeat(row.depth + 1);
            match row.edge_label {
                Some(label) => println!("{indent}-> {} [{label}]", row.species),
                None => println!("{indent}{}", row.species),
            }
        }
    }
}
