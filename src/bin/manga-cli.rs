use clap::{Parser, Subcommand};
use serde::Serialize;

use manga_relay::client::{
    chapter_page_url, cover_url, image_proxy_url, CatalogClient, ChapterList, CoverSize, Manga,
    MangaList,
};

#[derive(Parser)]
#[command(name = "manga-cli")]
#[command(about = "Browse the manga catalog through manga-relay", long_about = None)]
struct Cli {
    /// Catalog base URL (a relay mount or the upstream API).
    #[arg(short, long, default_value = "http://localhost:8080/api/mangadex")]
    url: String,

    /// Print raw JSON instead of a summary.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Most followed titles
    Popular {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },
    /// Recently updated titles
    Updated {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },
    /// Newest titles
    Newest {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },
    /// Search titles
    Search {
        title: String,
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
    },
    /// Show one title with its cover URL
    Show {
        id: String,
        #[arg(long, value_enum, default_value_t = CoverSize::Medium)]
        size: CoverSize,
    },
    /// List English chapters of a title
    Chapters {
        manga_id: String,
        #[arg(short, long, default_value_t = 0)]
        offset: u32,
    },
    /// Print page image URLs of a chapter
    Pages {
        chapter_id: String,
        #[arg(long)]
        data_saver: bool,
        /// Wrap page URLs through this image proxy endpoint
        #[arg(long)]
        via_proxy: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = CatalogClient::new(cli.url)?;

    match cli.command {
        Commands::Popular { page, limit } => {
            print_list(client.popular(page, limit).await?, cli.json)?;
        }
        Commands::Updated { page, limit } => {
            print_list(client.recently_updated(page, limit).await?, cli.json)?;
        }
        Commands::Newest { page, limit } => {
            print_list(client.newest(page, limit).await?, cli.json)?;
        }
        Commands::Search { title, limit } => {
            print_list(client.search(&title, limit).await?, cli.json)?;
        }
        Commands::Show { id, size } => {
            let manga = client.manga(&id).await?;
            if cli.json {
                return print_json(&manga);
            }
            print_manga(&manga, size);
        }
        Commands::Chapters { manga_id, offset } => {
            let chapters = client.chapters(&manga_id, offset).await?;
            if cli.json {
                return print_json(&chapters);
            }
            print_chapters(&chapters);
        }
        Commands::Pages {
            chapter_id,
            data_saver,
            via_proxy,
        } => {
            let at_home = client.at_home(&chapter_id).await?;
            if cli.json {
                return print_json(&at_home);
            }
            let files = if data_saver {
                &at_home.chapter.data_saver
            } else {
                &at_home.chapter.data
            };
            for file in files {
                let page =
                    chapter_page_url(&at_home.base_url, &at_home.chapter.hash, file, data_saver);
                match &via_proxy {
                    Some(proxy) => println!("{}", image_proxy_url(proxy, &page)?),
                    None => println!("{page}"),
                }
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_list(list: MangaList, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        return print_json(&list);
    }
    for manga in &list.data {
        let authors = manga.authors().join(", ");
        println!("{}  {}  [{}]", manga.id, manga.display_title(), authors);
    }
    println!("{}", list_footer(&list));
    Ok(())
}

fn list_footer(list: &MangaList) -> String {
    if list.data.is_empty() {
        return "-- no results".to_string();
    }
    format!(
        "-- {}-{} of {}",
        list.offset + 1,
        list.offset + list.data.len() as u32,
        list.total
    )
}

fn print_manga(manga: &Manga, size: CoverSize) {
    println!("{}", manga.display_title());
    println!("id:      {}", manga.id);
    if let Some(status) = &manga.attributes.status {
        println!("status:  {status}");
    }
    if let Some(year) = manga.attributes.year {
        println!("year:    {year}");
    }
    println!("authors: {}", manga.authors().join(", "));
    println!("artists: {}", manga.artists().join(", "));
    println!("tags:    {}", manga.tag_names().join(", "));
    if let Some(file) = manga.cover_file_name() {
        println!("cover:   {}", cover_url(&manga.id, file, size));
    }
    println!();
    println!("{}", manga.display_description());
}

fn print_chapters(chapters: &ChapterList) {
    for chapter in &chapters.data {
        let group = chapter.scanlation_group().unwrap_or("-");
        println!(
            "{}  {}  ({} pages, {group})",
            chapter.id,
            chapter.label(),
            chapter.attributes.pages
        );
    }
    println!("-- {} chapters total", chapters.total);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_footer() {
        let empty: MangaList =
            serde_json::from_value(json!({ "data": [], "offset": 0, "total": 0 })).unwrap();
        assert_eq!(list_footer(&empty), "-- no results");

        let page: MangaList = serde_json::from_value(json!({
            "data": [{ "id": "a" }, { "id": "b" }],
            "offset": 20,
            "total": 42
        }))
        .unwrap();
        assert_eq!(list_footer(&page), "-- 21-22 of 42");
    }
}
