use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{Anime, AnimeCatalog, AnimeId, AnimeStatus, CatalogConfig, CatalogReport, RatingKey};
use listing::{Listing, ListingQuery};
use quiz::QuizCatalog;
use site::{SiteOrchestrator, TrendingEntry};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use trending::{FileStorage, MemoryStorage, Storage, TrendingTracker};

/// Anime reviews - browse the catalog, track a watchlist, take the quiz
#[derive(Parser)]
#[command(name = "anime-reviews")]
#[command(about = "Browse anime review data from the site's CSV sheets", long_about = None)]
struct Cli {
    /// Directory holding anime.csv and reviews.csv
    #[arg(short, long, env = "ANIME_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Directory for the watchlist and trending state
    #[arg(long, env = "ANIME_STATE_DIR", default_value = ".anime-reviews")]
    state_dir: PathBuf,

    /// Keep watchlist state in memory only
    #[arg(long)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the top rated anime
    Top {
        /// Rating to rank by: site, visual, music, story or character
        #[arg(long, default_value = "site")]
        by: RatingKey,

        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// List the whole catalog sorted by a rating
    List {
        #[arg(long, default_value = "site")]
        sort: RatingKey,
    },

    /// Search titles (case-insensitive substring match)
    Search {
        query: String,
    },

    /// Show one anime with related titles and watch count
    Show {
        id: AnimeId,
    },

    /// Filtered, sorted, paged listing
    Browse {
        /// Required genre; repeat for several
        #[arg(long = "genre")]
        genres: Vec<String>,

        /// ongoing, completed or upcoming
        #[arg(long)]
        status: Option<AnimeStatus>,

        #[arg(long)]
        studio: Option<String>,

        #[arg(long)]
        search: Option<String>,

        /// Rating the minimum applies to
        #[arg(long, default_value = "site")]
        min_key: RatingKey,

        /// Minimum rating on the 0-10 scale
        #[arg(long)]
        min: Option<f32>,

        #[arg(long, default_value = "site")]
        sort: RatingKey,

        #[arg(long, default_value = "0")]
        offset: usize,

        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Show what is trending on watchlists this week
    Trending {
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Manage the watchlist
    Watch {
        #[command(subcommand)]
        action: WatchCommand,
    },

    /// Which anime character are you?
    Quiz {
        /// Option index per question, comma separated (interactive if omitted)
        #[arg(long, value_delimiter = ',')]
        choices: Option<Vec<usize>>,
    },

    /// Reload both sheets and print the load report
    ReloadReport,
}

#[derive(Subcommand)]
enum WatchCommand {
    /// Add an anime to the watchlist
    Add { id: AnimeId },
    /// Remove an anime from the watchlist
    Remove { id: AnimeId },
    /// Show the watchlist
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    tracing::debug!(
        data_dir = %cli.data_dir.display(),
        state_dir = %cli.state_dir.display(),
        ephemeral = cli.ephemeral,
        "starting"
    );

    let catalog = Arc::new(AnimeCatalog::new(CatalogConfig::from_data_dir(&cli.data_dir)));
    let storage: Arc<dyn Storage> = if cli.ephemeral {
        Arc::new(MemoryStorage::new())
    } else {
        Arc::new(FileStorage::new(&cli.state_dir))
    };
    let tracker = Arc::new(TrendingTracker::new(Some(storage)));
    let site = SiteOrchestrator::new(catalog, tracker);

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Top { by, limit } => handle_top(&site, by, limit).await?,
        Commands::List { sort } => handle_list(&site, sort).await?,
        Commands::Search { query } => handle_search(&site, &query).await?,
        Commands::Show { id } => handle_show(&site, id).await?,
        Commands::Browse {
            genres,
            status,
            studio,
            search,
            min_key,
            min,
            sort,
            offset,
            limit,
        } => {
            let mut query = ListingQuery::new().sorted_by(sort).with_page(offset, limit);
            query.genres = genres;
            query.status = status;
            query.studio = studio;
            query.search = search;
            if let Some(min) = min {
                query = query.with_min_rating(min_key, min);
            }
            handle_browse(&site, query).await?
        }
        Commands::Trending { limit } => handle_trending(&site, limit).await?,
        Commands::Watch { action } => handle_watch(&site, action).await?,
        Commands::Quiz { choices } => handle_quiz(choices)?,
        Commands::ReloadReport => handle_reload_report(&site).await?,
    }

    Ok(())
}

/// Handle the 'top' command
async fn handle_top(site: &SiteOrchestrator, by: RatingKey, limit: usize) -> Result<()> {
    let start = Instant::now();
    let top = site.top_rated(limit, by).await?;
    if top.is_empty() {
        println!("{} No anime loaded. Check --data-dir.", "!".yellow());
        return Ok(());
    }
    println!("{}", format!("Top {} by {} score:", top.len(), by).bold().blue());
    print_ranked(&top, by);
    println!("{}", format!("({:.2?})", start.elapsed()).dimmed());
    Ok(())
}

/// Handle the 'list' command
async fn handle_list(site: &SiteOrchestrator, sort: RatingKey) -> Result<()> {
    let all = site.all_sorted(sort).await?;
    println!("{}", format!("{} anime sorted by {}:", all.len(), sort).bold().blue());
    print_ranked(&all, sort);
    Ok(())
}

/// Handle the 'search' command
async fn handle_search(site: &SiteOrchestrator, query: &str) -> Result<()> {
    let matches = site.search(query).await?;
    println!("{}", format!("Search results for '{}':", query).bold().blue());
    if matches.is_empty() {
        println!("  No matches.");
    }
    for anime in matches.iter().take(20) {
        println!(
            "  {} {} [{}] - Site: {:.1}",
            format!("#{}", anime.id).green(),
            anime.title.bold(),
            anime.status,
            anime.ratings.site
        );
    }
    if matches.len() > 20 {
        println!("  ... and {} more", matches.len() - 20);
    }
    Ok(())
}

/// Handle the 'show' command
async fn handle_show(site: &SiteOrchestrator, id: AnimeId) -> Result<()> {
    let detail = site
        .anime_detail(id)
        .await?
        .ok_or_else(|| anyhow!("Anime {} not found", id))?;
    let anime = &detail.anime;

    let mut heading = format!("{} (#{})", anime.title, anime.id).bold().blue().to_string();
    if detail.is_trending {
        heading.push_str(&format!(" {}", "TRENDING".red().bold()));
    }
    println!("{heading}");
    println!("{}Status: {}", "• ".green(), anime.status);
    if let Some(episodes) = anime.episodes {
        println!("{}Episodes: {}", "• ".green(), episodes);
    }
    if let Some(year) = anime.year {
        let season = anime.season.as_deref().unwrap_or("");
        println!("{}Aired: {} {}", "• ".green(), season, year);
    }
    if !anime.studios.is_empty() {
        println!("{}Studios: {}", "• ".green(), anime.studios.join(", "));
    }
    if !anime.genres.is_empty() {
        println!("{}Genres: {}", "• ".green(), anime.genres.join(", "));
    }
    println!(
        "{}Scores: site {:.1} | visual {:.1} | music {:.1} | story {:.1} | character {:.1}",
        "• ".cyan(),
        anime.ratings.site,
        anime.ratings.visual,
        anime.ratings.music,
        anime.ratings.story,
        anime.ratings.character
    );
    println!("{}Watching: {}", "• ".cyan(), detail.watching_count);
    if !anime.description.is_empty() {
        println!("\n{}", anime.description);
    }

    if !anime.reviews.is_empty() {
        println!("\n{}", "Reviews:".bold());
        for review in &anime.reviews {
            let score = review
                .score
                .map(|s| format!("{s:.1}"))
                .unwrap_or_else(|| "-".to_string());
            let mut tags = Vec::new();
            if review.is_spoiler {
                tags.push("spoiler");
            }
            if review.is_preliminary {
                tags.push("preliminary");
            }
            let tags = if tags.is_empty() {
                String::new()
            } else {
                format!(" ({})", tags.join(", "))
            };
            println!("  {} [{}]{}: {}", review.username.green(), score, tags, review.content);
        }
    }

    if !detail.related.is_empty() {
        println!("\n{}", "Related:".bold());
        for related in &detail.related {
            println!(
                "  {} {} - similarity {:.1}",
                format!("#{}", related.anime.id).green(),
                related.anime.title,
                related.score
            );
        }
    }
    Ok(())
}

/// Handle the 'browse' command
async fn handle_browse(site: &SiteOrchestrator, query: ListingQuery) -> Result<()> {
    let sort = query.sort_by;
    let listing = site.browse(query).await?;
    print_listing(&listing, sort);
    Ok(())
}

/// Handle the 'trending' command
async fn handle_trending(site: &SiteOrchestrator, limit: usize) -> Result<()> {
    let trending = site.trending(limit).await?;
    print_trending(&trending);
    Ok(())
}

/// Handle the 'watch' command
async fn handle_watch(site: &SiteOrchestrator, action: WatchCommand) -> Result<()> {
    match action {
        WatchCommand::Add { id } => {
            let (anime, added) = site
                .add_to_watchlist(id)
                .await?
                .ok_or_else(|| anyhow!("Anime {} not found", id))?;
            if added {
                println!("{} Added {} to your watchlist", "✓".green(), anime.title.bold());
            } else {
                println!("{} is already on your watchlist", anime.title.bold());
            }
        }
        WatchCommand::Remove { id } => {
            if site.remove_from_watchlist(id).await? {
                println!("{} Removed #{} from your watchlist", "✓".green(), id);
            } else {
                println!("#{} is not on your watchlist", id);
            }
        }
        WatchCommand::List => {
            let entries = site.watchlist_entries().await?;
            println!("{}", format!("Watchlist ({}):", entries.len()).bold().blue());
            for (id, anime) in entries {
                match anime {
                    Some(anime) => println!("  {} {}", format!("#{id}").green(), anime.title),
                    None => println!("  {} {}", format!("#{id}").green(), "(not in catalog)".dimmed()),
                }
            }
        }
    }
    Ok(())
}

/// Handle the 'quiz' command
fn handle_quiz(choices: Option<Vec<usize>>) -> Result<()> {
    let catalog = QuizCatalog::builtin().context("Failed to load quiz catalog")?;
    let choices = match choices {
        Some(choices) => choices,
        None => ask_questions(&catalog)?,
    };
    let answers = catalog.answers_for(&choices)?;
    let result = catalog.calculate_result(&answers);

    println!();
    let emoji = result.emoji.as_deref().unwrap_or("");
    println!("{} {}", format!("You are {}!", result.name).bold().magenta(), emoji);
    println!("{}From: {}", "• ".green(), result.anime);
    println!("{}Rarity: {} ({}/5)", "• ".green(), result.rarity, result.rarity.weight());
    if !result.description.is_empty() {
        println!("{}", result.description);
    }

    println!("\n{}", "Other matches:".bold());
    for other in catalog
        .match_scores(&answers)
        .iter()
        .filter(|m| m.character.id != result.id)
        .take(3)
    {
        println!("  {} ({}) - {} points", other.character.name, other.character.anime, other.score);
    }
    Ok(())
}

fn ask_questions(catalog: &QuizCatalog) -> Result<Vec<usize>> {
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    let mut choices = Vec::with_capacity(catalog.questions().len());

    for (number, question) in catalog.questions().iter().enumerate() {
        println!("\n{}", format!("{}. {}", number + 1, question.prompt).bold());
        for (index, option) in question.options.iter().enumerate() {
            println!("  {}) {}", index + 1, option.text);
        }
        loop {
            print!("> ");
            std::io::stdout().flush()?;
            let Some(line) = lines.next() else {
                bail!("Quiz cancelled");
            };
            match line?.trim().parse::<usize>() {
                Ok(n) if (1..=question.options.len()).contains(&n) => {
                    choices.push(n - 1);
                    break;
                }
                _ => println!("Pick a number from 1 to {}", question.options.len()),
            }
        }
    }
    Ok(choices)
}

/// Handle the 'reload-report' command
async fn handle_reload_report(site: &SiteOrchestrator) -> Result<()> {
    let start = Instant::now();
    let report = site.reload().await?;
    print_report(&report);
    println!("{}", format!("({:.2?})", start.elapsed()).dimmed());
    Ok(())
}

fn print_ranked(anime: &[Anime], key: RatingKey) {
    for (rank, anime) in anime.iter().enumerate() {
        println!(
            "{}. {} [{}] - {}: {:.1}",
            (rank + 1).to_string().green(),
            anime.title,
            anime.genres.join(", "),
            key,
            anime.ratings.get(key)
        );
    }
}

fn print_listing(listing: &Listing, key: RatingKey) {
    println!(
        "{}",
        format!(
            "Showing {}-{} of {} (sorted by {}):",
            (listing.offset + 1).min(listing.total),
            listing.offset + listing.items.len(),
            listing.total,
            key
        )
        .bold()
        .blue()
    );
    for anime in &listing.items {
        println!(
            "  {} {} [{}] - {}: {:.1}",
            format!("#{}", anime.id).green(),
            anime.title,
            anime.status,
            key,
            anime.ratings.get(key)
        );
    }
    if listing.has_more() {
        println!("  ... use --offset {} for more", listing.offset + listing.items.len());
    }
}

fn print_trending(trending: &[TrendingEntry]) {
    println!("{}", "Trending this week:".bold().blue());
    if trending.is_empty() {
        println!("  Nothing yet. Add something with `watch add <id>`.");
    }
    for (rank, entry) in trending.iter().enumerate() {
        println!(
            "{}. {} - {} watching",
            (rank + 1).to_string().green(),
            entry.anime.title,
            entry.watching
        );
    }
}

fn print_report(report: &CatalogReport) {
    println!("{}", "Catalog load report:".bold().blue());
    if let Some(loaded_at) = report.loaded_at {
        println!("{}Loaded at: {}", "• ".green(), loaded_at);
    }
    print_file_report(&report.anime);
    match &report.reviews {
        Some(reviews) => print_file_report(reviews),
        None => println!("{}Reviews sheet: not configured", "• ".green()),
    }
    if !report.orphan_review_titles.is_empty() {
        println!(
            "{}Reviews with no matching anime: {}",
            "! ".yellow(),
            report.orphan_review_titles.join(", ")
        );
    }
}

fn print_file_report(report: &data_loader::LoadReport) {
    if !report.source_readable {
        println!("{}{}: {}", "! ".yellow(), report.file, "could not be read".red());
        return;
    }
    println!(
        "{}{}: {} rows, {} kept, {} skipped, {} warnings",
        "• ".green(),
        report.file,
        report.rows_read,
        report.rows_kept,
        report.rows_skipped,
        report.warning_count()
    );
    for issue in report.issues.iter().take(10) {
        println!("    line {}: {:?} {}", issue.line, issue.kind, issue.message);
    }
    if report.issues.len() > 10 {
        println!("    ... and {} more", report.issues.len() - 10);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_browse() {
        let cli = Cli::try_parse_from([
            "anime-reviews",
            "browse",
            "--genre",
            "Action",
            "--genre",
            "Drama",
            "--status",
            "Currently Airing",
            "--min-key",
            "visual",
            "--min",
            "7.5",
        ])
        .unwrap();
        match cli.command {
            Commands::Browse {
                genres,
                status,
                min_key,
                min,
                ..
            } => {
                assert_eq!(genres, vec!["Action", "Drama"]);
                assert_eq!(status, Some(AnimeStatus::Ongoing));
                assert_eq!(min_key, RatingKey::Visual);
                assert_eq!(min, Some(7.5));
            }
            _ => panic!("expected browse"),
        }
    }

    #[test]
    fn test_parse_quiz_choices() {
        let cli = Cli::try_parse_from(["anime-reviews", "quiz", "--choices", "0,1,2"]).unwrap();
        match cli.command {
            Commands::Quiz { choices } => assert_eq!(choices, Some(vec![0, 1, 2])),
            _ => panic!("expected quiz"),
        }
    }

    #[test]
    fn test_bad_rating_key_is_rejected() {
        assert!(Cli::try_parse_from(["anime-reviews", "top", "--by", "vibes"]).is_err());
    }
}
