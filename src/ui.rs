use chrono::{DateTime, Utc};
use console::{strip_ansi_codes, Term};
use owo_colors::OwoColorize;
use unicode_width::UnicodeWidthStr;

use aichainx_protocol::common::ModelListing;

use crate::catalog::Catalog;
use crate::dashboard::CreatorDashboard;
use crate::detail::{DetailTab, ModelDetailView};
use crate::display;
use crate::filter::ListingQuery;
use crate::wizard::{UploadWizard, WizardStep};

/// Terminal output helpers
pub struct UI {
    term: Term,
}

impl UI {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }

    /// Apply `color_fn` only when the terminal supports color
    fn colorize<F>(&self, text: &str, color_fn: F) -> String
    where
        F: FnOnce(&str) -> String,
    {
        if self.supports_color() {
            color_fn(text)
        } else {
            text.to_string()
        }
    }

    pub fn success(&self, message: &str) {
        let output = self.colorize(message, |m| m.green().bold().to_string());
        println!("{}", output);
    }

    pub fn error(&self, message: &str) {
        let output = self.colorize(message, |m| m.red().bold().to_string());
        eprintln!("{}", output);
    }

    pub fn warning(&self, message: &str) {
        let output = self.colorize(message, |m| m.yellow().bold().to_string());
        println!("{}", output);
    }

    pub fn info(&self, message: &str) {
        let output = self.colorize(message, |m| m.blue().bold().to_string());
        println!("{}", output);
    }

    /// Session state with a traffic-light color
    pub fn format_auth_status(&self, authenticated: bool, expired: bool) -> String {
        let text = if authenticated {
            "Authenticated"
        } else if expired {
            "Session expired"
        } else {
            "Not authenticated"
        };

        if self.supports_color() {
            if authenticated {
                text.green().to_string()
            } else if expired {
                text.yellow().to_string()
            } else {
                text.red().to_string()
            }
        } else {
            text.to_string()
        }
    }

    pub fn format_wallet_status(&self, endpoint: Option<&str>) -> String {
        match endpoint {
            Some(url) => self.colorize(url, |u| u.green().to_string()),
            None => self.colorize("No wallet configured", |t| t.yellow().to_string()),
        }
    }

    pub fn format_user_field(&self, value: Option<String>) -> String {
        value.unwrap_or_else(|| "-".to_string())
    }

    pub fn blank_line(&self) {
        println!();
    }

    pub fn header(&self, title: &str) {
        let term_width = self.width();
        let title_len = title.width() + 4;
        let line_len = if term_width > title_len {
            (term_width - title_len) / 2
        } else {
            0
        };

        let line = "═".repeat(line_len.min(38));

        println!();
        if self.supports_color() {
            println!("{} {} {}", line.cyan(), title.cyan().bold(), line.cyan());
        } else {
            println!("{} {} {}", line, title, line);
        }
        println!();
    }

    pub fn separator(&self) {
        let line = "─".repeat(self.width().min(80));
        if self.supports_color() {
            println!("{}", line.dimmed());
        } else {
            println!("{}", line);
        }
    }

    /// Bordered label/value card
    pub fn card(&self, title: &str, content: Vec<(&str, String)>) {
        let card_width = self.width().saturating_sub(4).clamp(50, 80);
        let supports_color = self.supports_color();

        println!("╭{}╮", "─".repeat(card_width - 2));
        let title_spaces = card_width.saturating_sub(title.width() + 4);
        if supports_color {
            println!("│ {} {}│", title.cyan().bold(), " ".repeat(title_spaces));
        } else {
            println!("│ {} {}│", title, " ".repeat(title_spaces));
        }
        println!("├{}┤", "─".repeat(card_width - 2));

        for (label, value) in content {
            // Width is measured without ANSI codes
            let content_width =
                strip_ansi_codes(label).width() + strip_ansi_codes(&value).width() + 4;
            let spaces = if content_width < card_width - 1 {
                card_width - content_width - 1
            } else {
                1
            };

            if supports_color {
                println!("│ {}: {}{}│", label.dimmed(), value, " ".repeat(spaces));
            } else {
                println!("│ {}: {}{}│", label, value, " ".repeat(spaces));
            }
        }

        println!("╰{}╯", "─".repeat(card_width - 2));
        println!();
    }

    pub fn width(&self) -> usize {
        self.term.size().1 as usize
    }

    pub fn supports_color(&self) -> bool {
        self.term.features().colors_supported()
    }

    /// Box around free-form lines such as code snippets
    pub fn box_content(&self, title: &str, lines: Vec<String>) {
        let max_line_width = lines.iter().map(|l| l.width()).max().unwrap_or(0);
        let box_width = (max_line_width + 4).max(title.width() + 4);

        println!("┌{}┐", "─".repeat(box_width - 2));
        let title_pad = " ".repeat(box_width - title.width() - 4);
        if self.supports_color() {
            println!("│ {} {}│", title.cyan().bold(), title_pad);
        } else {
            println!("│ {} {}│", title, title_pad);
        }

        if !lines.is_empty() {
            println!("├{}┤", "─".repeat(box_width - 2));
            for line in lines {
                println!("│ {}{} │", line, " ".repeat(box_width - line.width() - 4));
            }
        }

        println!("└{}┘", "─".repeat(box_width - 2));
    }

    // ------------------------------------------------------------------
    // Page renderers
    // ------------------------------------------------------------------

    pub fn render_home(&self, catalog: &Catalog, now: DateTime<Utc>) {
        self.header("AIChainX");
        println!("Decentralized marketplace for AI models");
        self.blank_line();

        let stats = catalog.stats();
        self.card(
            "Marketplace",
            vec![
                ("AI Models", stats.listings.to_string()),
                ("Creators", stats.creators.to_string()),
                ("Trending", stats.trending.to_string()),
                ("Total Usage", display::format_usage(stats.total_usage)),
            ],
        );

        self.info("Trending models");
        for listing in catalog.all().iter().filter(|l| l.trending) {
            self.listing_line(listing, now);
        }
        self.blank_line();
        println!("Run `aichainx browse` to explore all models.");
    }

    pub fn render_marketplace(&self, catalog: &Catalog, query: &ListingQuery, now: DateTime<Utc>) {
        self.header("Marketplace");

        let counts = catalog
            .category_counts()
            .into_iter()
            .map(|(c, n)| format!("{} ({})", c.short_label(), n))
            .collect::<Vec<_>>()
            .join("  ");
        println!("Categories: {}", counts);

        let results = query.apply(catalog.all(), now);
        let sort = query.sort.map(|k| k.label()).unwrap_or("Unsorted");
        println!(
            "Showing {} of {} models  ·  sorted by {}",
            results.len(),
            catalog.len(),
            sort
        );
        self.separator();

        if results.is_empty() {
            self.warning("No models found");
            println!("Try adjusting your search or filters.");
            return;
        }

        for listing in results {
            self.listing_summary(listing, now);
        }
    }

    fn listing_line(&self, listing: &ModelListing, now: DateTime<Utc>) {
        println!(
            "  {}  {}  ★ {}  {} uses  {}",
            self.colorize(&listing.name, |n| n.bold().to_string()),
            listing.price,
            display::format_rating(listing.rating),
            display::format_usage(listing.usage),
            display::format_relative(listing.updated_at, now),
        );
    }

    fn listing_summary(&self, listing: &ModelListing, now: DateTime<Utc>) {
        let trending = if listing.trending {
            self.colorize(" TRENDING", |t| t.magenta().bold().to_string())
        } else {
            String::new()
        };
        println!(
            "{}{}  [{}]",
            self.colorize(&listing.name, |n| n.cyan().bold().to_string()),
            trending,
            listing.category.short_label()
        );
        println!("  {}", listing.description);
        println!(
            "  {}  ★ {}  {} uses  by {}  updated {}",
            self.colorize(&listing.price.to_string(), |p| p.green().to_string()),
            display::format_rating(listing.rating),
            display::format_usage(listing.usage),
            listing.creator,
            display::format_relative(listing.updated_at, now)
        );
        let tags = display::tag_line(&listing.tags, 3);
        if !tags.is_empty() {
            println!("  {}", self.colorize(&tags, |t| t.dimmed().to_string()));
        }
        println!("  id: {}", listing.id);
        self.blank_line();
    }

    pub fn render_detail(&self, view: &ModelDetailView<'_>, now: DateTime<Utc>, contract_address: &str) {
        let listing = view.listing();
        self.header(&listing.name);
        println!("{}", listing.description);
        self.blank_line();
        self.card("Summary", view.summary(now));

        let tabs = DetailTab::ALL
            .iter()
            .map(|t| {
                if *t == view.tab() {
                    self.colorize(&format!("[{}]", t.label()), |s| s.cyan().bold().to_string())
                } else {
                    t.label().to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("  ");
        println!("{}", tabs);
        self.separator();

        match view.tab() {
            DetailTab::Overview => {
                println!("{}", listing.description);
                self.blank_line();
                println!("Tags: {}", display::tag_line(&listing.tags, listing.tags.len()));
            }
            DetailTab::Performance => self.card("Performance", view.performance()),
            DetailTab::Integration => {
                self.box_content("SDK", view.sdk_snippet().lines().map(String::from).collect());
                self.blank_line();
                self.box_content(
                    "Smart Contract",
                    view.contract_snippet(contract_address)
                        .lines()
                        .map(String::from)
                        .collect(),
                );
            }
        }
    }

    pub fn render_wizard_progress(&self, step: WizardStep) {
        let bar = (1..=WizardStep::COUNT)
            .map(|n| if n <= step.number() { "●" } else { "○" })
            .collect::<Vec<_>>()
            .join("─");
        self.header(&step.to_string());
        println!("{}", self.colorize(&bar, |b| b.cyan().to_string()));
        self.blank_line();
    }

    pub fn render_review(&self, wizard: &UploadWizard) {
        self.card("Review & Deploy", wizard.review());
    }

    pub fn render_dashboard(&self, dashboard: &CreatorDashboard<'_>, currency: &str, now: DateTime<Utc>) {
        self.header("Creator Dashboard");
        println!("Creator: {}", dashboard.creator());
        self.blank_line();

        let stats = dashboard.stats();
        self.card(
            "Overview",
            vec![
                ("Active Models", stats.active_models.to_string()),
                ("Total Usage", display::format_usage(stats.total_usage)),
                (
                    "Average Rating",
                    stats
                        .average_rating
                        .map(display::format_rating)
                        .unwrap_or_else(|| "-".to_string()),
                ),
                ("Listed Value", format!("{:.2} {}", stats.listed_value, currency)),
            ],
        );

        if dashboard.is_empty() {
            self.warning("No models yet");
            println!("{}", dashboard.empty_state_hint());
            return;
        }

        self.info("My Models");
        for listing in dashboard.listings() {
            self.listing_line(listing, now);
        }
    }
}

impl Default for UI {
    fn default() -> Self {
        Self::new()
    }
}

/// Spinner for waits of unknown length
pub fn create_spinner(message: &str) -> indicatif::ProgressBar {
    let pb = indicatif::ProgressBar::new_spinner();
    pb.set_style(
        indicatif::ProgressStyle::default_spinner()
            .template("{spinner:.cyan} [{elapsed_precise:.dim}] {msg}")
            .unwrap_or_else(|_| indicatif::ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
