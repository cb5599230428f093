//! Movie Catalog CLI
//!
//! Command-line tool for adding, importing, syncing and exporting a
//! personal movie collection.

use clap::{Args, Parser, Subcommand};
use log::warn;
use mc_core::{
    check_duplicate, read_records, scan_import_dir, to_csv_string, to_json_string, write_csv,
    AddOptions, Collection, CollectionStats, Config, Error, Field, Filter, ImportFormat,
    MergeSummary, MovieRecord, Outcome,
};
use std::fs;
use std::path::{Path, PathBuf};

mod logging;

#[derive(Parser)]
#[command(name = "mc-cli")]
#[command(about = "Personal movie collection manager", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Fields of a movie given on the command line
#[derive(Args)]
struct MovieArgs {
    /// Movie title
    #[arg(short, long, default_value = "")]
    title: String,

    /// Release year
    #[arg(short, long, default_value = "")]
    year: String,

    /// UPC from a barcode scan
    #[arg(short, long, default_value = "")]
    upc: String,
}

impl MovieArgs {
    fn to_record(&self) -> MovieRecord {
        MovieRecord::new(self.title.trim())
            .with_year(self.year.trim())
            .with_upc(self.upc.trim())
    }
}

/// Descriptive fields shared by `add` and `edit`
#[derive(Args)]
struct DetailArgs {
    #[arg(long, default_value = "")]
    director: String,

    #[arg(long, default_value = "")]
    producer: String,

    #[arg(long, default_value = "")]
    studio: String,

    #[arg(long, default_value = "")]
    genre: String,

    #[arg(long, default_value = "")]
    runtime: String,

    /// Comma-separated formats, e.g. "DVD,Blu-ray"
    #[arg(long, default_value = "")]
    formats: String,

    #[arg(long, default_value = "")]
    asin: String,

    #[arg(long, default_value = "")]
    notes: String,

    #[arg(long, default_value = "")]
    image_url: String,
}

impl DetailArgs {
    fn apply(self, record: &mut MovieRecord) {
        record.director = self.director;
        record.producer = self.producer;
        record.studio = self.studio;
        record.genre = self.genre;
        record.runtime = self.runtime;
        record.formats = self.formats;
        record.asin = self.asin;
        record.notes = self.notes;
        record.image_url = self.image_url;
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Add a movie to the collection
    Add {
        #[command(flatten)]
        movie: MovieArgs,

        #[command(flatten)]
        details: DetailArgs,

        /// Add even if a duplicate is found
        #[arg(long)]
        force: bool,
    },

    /// Edit a movie found by UPC, or by title and year
    ///
    /// Only the values given are changed.
    Edit {
        #[command(flatten)]
        movie: MovieArgs,

        #[arg(long, default_value = "")]
        set_title: String,

        #[arg(long, default_value = "")]
        set_year: String,

        #[arg(long, default_value = "")]
        set_upc: String,

        #[command(flatten)]
        details: DetailArgs,

        /// Apply even if the edit makes it a duplicate of another movie
        #[arg(long)]
        force: bool,
    },

    /// Check whether a movie is already in the collection
    Check {
        #[command(flatten)]
        movie: MovieArgs,
    },

    /// Remove a movie by UPC, or by title and year
    Remove {
        #[command(flatten)]
        movie: MovieArgs,
    },

    /// List movies
    List {
        /// Search title, director, genre and UPC
        #[arg(short, long)]
        search: Option<String>,

        #[arg(long)]
        genre: Option<String>,

        #[arg(long)]
        year: Option<String>,

        #[arg(long)]
        format: Option<String>,

        /// Sort by a field, e.g. "title" or "year"
        #[arg(long)]
        sort: Option<String>,

        /// Sort in descending order
        #[arg(long, requires = "sort")]
        desc: bool,

        /// Maximum number of rows to display
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Import movies from a CSV or JSON file, or every such file in a directory
    Import {
        /// File to import
        #[arg(short, long, conflicts_with = "dir", required_unless_present = "dir")]
        file: Option<PathBuf>,

        /// Directory to scan for .csv/.json files
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Merge a remote sheet snapshot (JSON array) into the collection
    Sync {
        /// Path to the remote snapshot
        #[arg(short, long)]
        remote: PathBuf,
    },

    /// Export the collection
    Export {
        /// Output format (csv or json)
        #[arg(long, default_value = "csv")]
        format: String,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show collection statistics
    Stats,

    /// Back up the collection
    Backup,

    /// Replace the collection with the last backup
    Restore,

    /// Delete the stored collection (the backup is kept)
    Clear,

    /// Parse and display a single CSV or JSON file without importing it
    Parse {
        /// Path to the file
        #[arg(short, long)]
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> mc_core::Result<()> {
    let config = Config::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Add {
            movie,
            details,
            force,
        } => {
            let mut record = movie.to_record();
            details.apply(&mut record);
            cmd_add(&config, record, force)
        }
        Commands::Edit {
            movie,
            set_title,
            set_year,
            set_upc,
            details,
            force,
        } => {
            let mut changes = MovieRecord::new(set_title).with_year(set_year).with_upc(set_upc);
            details.apply(&mut changes);
            cmd_edit(&config, &movie.to_record(), &changes, force)
        }
        Commands::Check { movie } => cmd_check(&config, &movie.to_record()),
        Commands::Remove { movie } => cmd_remove(&config, &movie.to_record()),
        Commands::List {
            search,
            genre,
            year,
            format,
            sort,
            desc,
            limit,
        } => {
            let sort = sort.map(|name| (name, desc));
            cmd_list(&config, search, Filter { genre, year, format }, sort, limit)
        }
        Commands::Import { file, dir } => cmd_import(&config, file, dir),
        Commands::Sync { remote } => cmd_sync(&config, &remote),
        Commands::Export { format, output } => cmd_export(&config, &format, &output),
        Commands::Stats => cmd_stats(&config),
        Commands::Backup => cmd_backup(&config),
        Commands::Restore => cmd_restore(&config),
        Commands::Clear => cmd_clear(&config),
        Commands::Parse { file } => cmd_parse(&file),
    }
}

fn cmd_add(config: &Config, record: MovieRecord, force: bool) -> mc_core::Result<()> {
    let store = config.store();
    let mut collection = store.load()?;

    let options = add_options(config, force);

    let label = record.to_string();
    let existing = check_duplicate(&record, collection.records()).describe();
    let outcome = collection.add_movie(record, &options)?;

    if !outcome.accepted {
        println!("Not added: {}", existing);
        println!("Re-run with --force to add it anyway.");
        return Ok(());
    }

    if outcome.reason.is_some() {
        println!("Warning: {}", existing);
    }

    store.save(&collection)?;
    println!("Added {} ({} movies)", label, collection.len());

    Ok(())
}

fn add_options(config: &Config, allow_duplicate: bool) -> AddOptions {
    AddOptions {
        allow_duplicate,
        date_format: config.add.date_format.clone(),
        ..AddOptions::default()
    }
}

fn cmd_edit(
    config: &Config,
    target: &MovieRecord,
    changes: &MovieRecord,
    force: bool,
) -> mc_core::Result<()> {
    let store = config.store();
    let mut collection = store.load()?;

    let Some(outcome) = collection.update_movie(target, changes, force) else {
        println!("No matching movie found");
        return Ok(());
    };

    if !outcome.accepted {
        if let Some(reason) = &outcome.reason {
            println!("Not updated: would duplicate another movie ({})", reason);
        }
        println!("Re-run with --force to apply it anyway.");
        return Ok(());
    }

    if let Some(reason) = &outcome.reason {
        println!("Warning: possible duplicate of another movie ({})", reason);
    }

    store.save(&collection)?;
    println!("Updated {}", target);

    Ok(())
}

fn cmd_check(config: &Config, record: &MovieRecord) -> mc_core::Result<()> {
    let collection = config.store().load()?;

    match check_duplicate(record, collection.records()) {
        Outcome::NotDuplicate => println!("Not in collection: {}", record),
        outcome @ Outcome::Duplicate { .. } => {
            println!("{}", outcome.describe());
            if let Outcome::Duplicate { matched, .. } = outcome {
                print_movie(matched);
            }
        }
    }

    Ok(())
}

fn cmd_remove(config: &Config, record: &MovieRecord) -> mc_core::Result<()> {
    let store = config.store();
    let mut collection = store.load()?;

    match collection.remove_movie(record) {
        Some(removed) => {
            store.save(&collection)?;
            println!("Removed {} ({} movies left)", removed, collection.len());
        }
        None => println!("No matching movie found"),
    }

    Ok(())
}

fn cmd_list(
    config: &Config,
    search: Option<String>,
    filter: Filter,
    sort: Option<(String, bool)>,
    limit: Option<usize>,
) -> mc_core::Result<()> {
    let collection = config.store().load()?;

    let mut movies = match sort {
        Some((name, descending)) => {
            let field = Field::from_header(&name).ok_or(Error::UnknownColumn(name))?;
            collection.sorted(field, descending)
        }
        None => collection.iter().collect(),
    };
    movies.retain(|m| filter.matches(m));

    if let Some(query) = search {
        let hits = collection.search(&query);
        movies.retain(|m| hits.iter().any(|h| std::ptr::eq(*h, *m)));
    }

    println!("Title\tYear\tFormats\tUPC\tDate Added");
    println!("{}", "-".repeat(60));

    let row_limit = limit.unwrap_or(movies.len());
    for movie in movies.iter().take(row_limit) {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            movie.title, movie.year, movie.formats, movie.upc, movie.date_added
        );
    }

    if movies.len() > row_limit {
        println!("... ({} more movies)", movies.len() - row_limit);
    }

    Ok(())
}

fn cmd_import(config: &Config, file: Option<PathBuf>, dir: Option<PathBuf>) -> mc_core::Result<()> {
    let (files, skip_unreadable) = match (file, dir) {
        (Some(file), _) => (vec![file], false),
        (None, Some(dir)) => (scan_import_dir(&dir)?, true),
        (None, None) => (Vec::new(), false),
    };

    let store = config.store();
    let mut collection = store.load()?;
    let (added, duplicates) = import_files(
        &mut collection,
        &files,
        skip_unreadable,
        &add_options(config, false),
    )?;

    store.save(&collection)?;

    println!();
    println!("Import completed!");
    println!("  {} new movies imported", added);
    println!("  {} duplicates skipped", duplicates);
    println!("  {} total movies", collection.len());

    Ok(())
}

/// Merge every file into the collection, returning (added, duplicates)
///
/// A file that cannot be read or parsed aborts the import, unless
/// `skip_unreadable` is set (directory scans), in which case it is logged
/// and skipped.
fn import_files(
    collection: &mut Collection,
    files: &[PathBuf],
    skip_unreadable: bool,
    options: &AddOptions,
) -> mc_core::Result<(usize, usize)> {
    let mut added = 0;
    let mut duplicates = 0;

    for path in files {
        let records = match read_records(path) {
            Ok(records) => records,
            Err(e) if skip_unreadable => {
                warn!("skipping {}: {}", path.display(), e);
                continue;
            }
            Err(e) => return Err(e),
        };

        let summary = collection.merge_stamped(&records, options);
        println!("{}:", path.display());
        print_merge_summary(collection, &summary);
        added += summary.added;
        duplicates += summary.duplicates;
    }

    Ok((added, duplicates))
}

fn cmd_sync(config: &Config, remote: &Path) -> mc_core::Result<()> {
    let content = fs::read_to_string(remote).map_err(|e| Error::FileRead {
        path: remote.to_path_buf(),
        source: e,
    })?;
    let records = mc_core::parse_json_str(&content)?;

    let store = config.store();
    let mut collection = store.load()?;
    let summary = collection.merge_stamped(&records, &add_options(config, false));
    store.save(&collection)?;

    println!("Synced {} remote movies", records.len());
    print_merge_summary(&collection, &summary);

    Ok(())
}

fn cmd_export(config: &Config, format: &str, output: &Path) -> mc_core::Result<()> {
    let collection = config.store().load()?;
    if collection.is_empty() {
        warn!("collection is empty, exporting header only");
    }

    match ImportFormat::from_name(format)? {
        ImportFormat::Csv => write_csv(output, collection.records(), &config.export_columns()?)?,
        ImportFormat::Json => fs::write(output, to_json_string(collection.records())?)?,
    }

    println!("Exported {} movies to {}", collection.len(), output.display());

    Ok(())
}

fn cmd_stats(config: &Config) -> mc_core::Result<()> {
    let collection = config.store().load()?;
    let stats = CollectionStats::compute(&collection);

    println!("Total movies: {}", stats.total);

    for (label, counts) in [
        ("Genres", &stats.by_genre),
        ("Years", &stats.by_year),
        ("Formats", &stats.by_format),
    ] {
        if counts.is_empty() {
            continue;
        }
        println!();
        println!("{}:", label);
        for (key, count) in counts {
            println!("  {}: {}", key, count);
        }
    }

    if !stats.recently_added.is_empty() {
        println!();
        println!("Recently added:");
        for movie in &stats.recently_added {
            println!("  {} - {}", movie, movie.date_added);
        }
    }

    Ok(())
}

fn cmd_backup(config: &Config) -> mc_core::Result<()> {
    let store = config.store();
    let collection = store.load()?;
    let backup = store.create_backup(&collection)?;

    println!(
        "Backed up {} movies to {} at {}",
        backup.movies.len(),
        store.backup_path().display(),
        backup.timestamp
    );

    Ok(())
}

fn cmd_restore(config: &Config) -> mc_core::Result<()> {
    let collection = config.store().restore_backup()?;
    println!("Restored {} movies from backup", collection.len());
    Ok(())
}

fn cmd_clear(config: &Config) -> mc_core::Result<()> {
    config.store().clear()?;
    println!("Collection cleared");
    Ok(())
}

fn cmd_parse(file: &Path) -> mc_core::Result<()> {
    let records = read_records(file)?;

    println!("File: {}", file.display());
    println!("Movies: {}", records.len());
    println!();

    // Preview the first 10 movies as CSV
    let preview = &records[..records.len().min(10)];
    print!("{}", to_csv_string(preview, &Field::ALL));

    if records.len() > 10 {
        println!("... ({} more movies)", records.len() - 10);
    }

    Ok(())
}

fn print_merge_summary(collection: &Collection, summary: &MergeSummary) {
    println!("  {} added, {} duplicates skipped", summary.added, summary.duplicates);

    for possible in &summary.possible_duplicates {
        if let Some(movie) = collection.records().get(possible.merged_index) {
            println!(
                "  possible duplicate: {} (same title as \"{}\")",
                movie, possible.matched_title
            );
        }
    }
}

fn print_movie(movie: &MovieRecord) {
    for field in Field::ALL {
        let value = movie.get(field);
        if !value.is_empty() {
            println!("  {}: {}", field, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn options() -> AddOptions {
        AddOptions {
            today: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            ..AddOptions::default()
        }
    }

    #[test]
    fn test_import_file_error_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.csv");
        let mut collection = Collection::new();

        let result = import_files(&mut collection, &[missing], false, &options());

        assert!(matches!(result, Err(Error::FileRead { .. })));
        assert!(collection.is_empty());
    }

    #[test]
    fn test_import_dir_skips_unreadable_files() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("a.csv");
        let bad = dir.path().join("b.json");
        fs::write(&good, "Title,Year\nHeat,1995\n").unwrap();
        fs::write(&bad, r#"{"title": "not an array"}"#).unwrap();
        let mut collection = Collection::new();

        let (added, duplicates) =
            import_files(&mut collection, &[good, bad], true, &options()).unwrap();

        assert_eq!((added, duplicates), (1, 0));
        assert_eq!(collection.records()[0].date_added, "2024-03-01");
    }

    #[test]
    fn test_import_file_parse_error_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("b.json");
        fs::write(&bad, r#"{"title": "not an array"}"#).unwrap();

        let result = import_files(&mut Collection::new(), &[bad], false, &options());
        assert!(matches!(result, Err(Error::NotAnArray)));
    }

    #[test]
    fn test_list_sort_flags_parse() {
        let cli = Cli::try_parse_from(["mc-cli", "list", "--sort", "year", "--desc"]).unwrap();
        match cli.command {
            Commands::List { sort, desc, .. } => {
                assert_eq!(sort.as_deref(), Some("year"));
                assert!(desc);
            }
            _ => panic!("expected list"),
        }

        assert!(Cli::try_parse_from(["mc-cli", "list", "--desc"]).is_err());
    }

    #[test]
    fn test_edit_collects_changes() {
        let cli = Cli::try_parse_from([
            "mc-cli", "edit", "-t", "Heat", "-y", "1995", "--set-year", "1996", "--genre", "Crime",
        ])
        .unwrap();
        match cli.command {
            Commands::Edit {
                movie,
                set_year,
                details,
                ..
            } => {
                assert_eq!(movie.to_record().title, "Heat");
                assert_eq!(set_year, "1996");
                assert_eq!(details.genre, "Crime");
            }
            _ => panic!("expected edit"),
        }
    }
}
