// html side of the scraping, every selector the site's markup is coupled to lives here.
// scraper::Html isn't Send so everything in here is sync and returns owned data
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::server::dtos::catalog_dto::{
    CatalogEntry, DetailRecord, DirectLink, LinkGroup, MediaType,
};

/// visible text of the only download host we know how to follow
pub const PROVIDER_LABEL: &str = "HubDrive";
/// the hubcloud landing pages list several qualities, this is the one we pick
pub const PREFERRED_QUALITY: &str = "1080p";

const MEDIA_EXTENSIONS: [&str; 3] = [".mkv", ".mp4", ".m3u8"];

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector should parse")
}

static CARD_SELECTOR: Lazy<Selector> = Lazy::new(|| selector(".card-grid > *"));
static CARD_TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| selector(".movie-card-title"));
static IMG_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("img"));
static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("a"));

static SEASON_CONTENT_SELECTOR: Lazy<Selector> = Lazy::new(|| selector(".season-content"));
static PAGE_TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| selector(".page-title"));
static POSTER_SELECTOR: Lazy<Selector> = Lazy::new(|| selector(".poster-image img"));
static SYNOPSIS_SELECTOR: Lazy<Selector> = Lazy::new(|| selector(".content-section p"));
static SEASON_ITEM_SELECTOR: Lazy<Selector> = Lazy::new(|| selector(".season-item"));
static EPISODE_TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| selector(".episode-title"));
static EPISODE_ITEM_SELECTOR: Lazy<Selector> =
    Lazy::new(|| selector(".episode-download-item"));
static EPISODE_FILE_INFO_SELECTOR: Lazy<Selector> =
    Lazy::new(|| selector(".episode-file-info"));
static DOWNLOAD_ITEM_SELECTOR: Lazy<Selector> = Lazy::new(|| selector(".download-item"));
static DOWNLOAD_TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| selector(".flex-1.text-left.font-semibold"));

static DRIVE_BUTTON_SELECTOR: Lazy<Selector> =
    Lazy::new(|| selector(".btn.btn-primary.btn-user.btn-success1.m-1"));
static H3_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("h3"));
static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("title"));

fn text_of(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn select_text(scope: ElementRef, sel: &Selector) -> Option<String> {
    scope.select(sel).next().map(text_of)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// href of the first anchor in scope whose text mentions `label`
fn labelled_href(scope: ElementRef, label: &str) -> Option<String> {
    scope
        .select(&ANCHOR_SELECTOR)
        .find(|a| a.text().collect::<String>().contains(label))
        .and_then(|a| a.value().attr("href"))
        .map(|href| href.to_string())
}

/// listing grid, cards missing a title, link or thumbnail are dropped
pub fn parse_catalog(html: &str) -> Vec<CatalogEntry> {
    let document = Html::parse_document(html);

    document
        .select(&CARD_SELECTOR)
        .filter_map(|card| {
            let title = non_empty(select_text(card, &CARD_TITLE_SELECTOR));
            let link = non_empty(card.value().attr("href").map(str::to_string));
            let image = non_empty(
                card.select(&IMG_SELECTOR)
                    .next()
                    .and_then(|img| img.value().attr("src"))
                    .map(str::to_string),
            );

            match (title, link, image) {
                (Some(title), Some(link), Some(image)) => Some(CatalogEntry { title, link, image }),
                (title, link, _) => {
                    debug!("skipping incomplete card title={:?} link={:?}", title, link);
                    None
                }
            }
        })
        .collect()
}

pub fn parse_detail(html: &str) -> DetailRecord {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let media_type = if root.select(&SEASON_CONTENT_SELECTOR).next().is_some() {
        MediaType::Series
    } else {
        MediaType::Movie
    };

    let title = select_text(root, &PAGE_TITLE_SELECTOR).unwrap_or_default();
    let image = root
        .select(&POSTER_SELECTOR)
        .next()
        .and_then(|img| img.value().attr("src"))
        .unwrap_or_default()
        .to_string();
    let synopsis = select_text(root, &SYNOPSIS_SELECTOR).unwrap_or_default();

    let link_groups = match media_type {
        MediaType::Series => parse_season_groups(root),
        MediaType::Movie => parse_movie_groups(root),
    };

    DetailRecord {
        title,
        synopsis,
        image,
        imdb_id: String::new(),
        media_type,
        link_groups,
    }
}

fn parse_season_groups(root: ElementRef) -> Vec<LinkGroup> {
    root.select(&SEASON_ITEM_SELECTOR)
        .filter_map(|season| {
            let season_title = non_empty(select_text(season, &EPISODE_TITLE_SELECTOR))?;

            let direct_links: Vec<DirectLink> = season
                .select(&EPISODE_ITEM_SELECTOR)
                .filter_map(|episode| {
                    let file_info = select_text(episode, &EPISODE_FILE_INFO_SELECTOR)?;
                    let link = labelled_href(episode, PROVIDER_LABEL)?;
                    Some(DirectLink {
                        title: file_info.replace('\n', " "),
                        link,
                    })
                })
                .collect();

            if direct_links.is_empty() {
                debug!("season '{}' has no {} links", season_title, PROVIDER_LABEL);
                return None;
            }

            Some(LinkGroup {
                title: season_title,
                direct_links,
            })
        })
        .collect()
}

fn parse_movie_groups(root: ElementRef) -> Vec<LinkGroup> {
    root.select(&DOWNLOAD_ITEM_SELECTOR)
        .filter_map(|item| {
            let title = select_text(item, &DOWNLOAD_TITLE_SELECTOR)?;
            let link = labelled_href(item, PROVIDER_LABEL)?;
            Some(LinkGroup {
                title: title.clone(),
                direct_links: vec![DirectLink { title, link }],
            })
        })
        .collect()
}

/// the big green download button on hubdrive pages
pub fn extract_drive_button(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&DRIVE_BUTTON_SELECTOR)
        .next()
        .and_then(|btn| btn.value().attr("href"))
        .map(str::to_string)
}

/// first link under a heading that mentions the preferred quality
pub fn extract_quality_anchor(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&H3_SELECTOR)
        .filter(|h3| h3.text().collect::<String>().contains(PREFERRED_QUALITY))
        .find_map(|h3| {
            h3.select(&ANCHOR_SELECTOR)
                .find_map(|a| a.value().attr("href"))
                .map(str::to_string)
        })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadCandidate {
    pub href: String,
    pub label: String,
}

#[derive(Debug, Clone, Default)]
pub struct HosterPage {
    pub title: String,
    pub candidates: Vec<DownloadCandidate>,
}

fn is_media_href(href: &str) -> bool {
    url::Url::parse(href)
        .map(|u| {
            let path = u.path().to_ascii_lowercase();
            MEDIA_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
        })
        .unwrap_or(false)
}

fn is_download_button(a: ElementRef, label: &str) -> bool {
    a.value().classes().any(|c| c == "btn") && label.to_ascii_lowercase().contains("download")
}

/// absolute links on a file host page that look like they lead to the video itself
pub fn parse_hoster_page(html: &str) -> HosterPage {
    let document = Html::parse_document(html);
    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(text_of)
        .unwrap_or_default();

    let mut candidates: Vec<DownloadCandidate> = Vec::new();
    for a in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = a.value().attr("href") else {
            continue;
        };
        if !href.starts_with("http://") && !href.starts_with("https://") {
            continue;
        }

        let label = text_of(a);
        if !is_media_href(href) && !is_download_button(a, &label) {
            continue;
        }
        if candidates.iter().any(|c| c.href == href) {
            continue;
        }

        candidates.push(DownloadCandidate {
            href: href.to_string(),
            label,
        });
    }

    HosterPage { title, candidates }
}
