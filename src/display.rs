use crate::config::AppConfig;
use crate::core::error::ChatError;
use crate::providers::{Message, Role};
use crate::relay::TurnView;
use crate::utils::text::wrap_text;
use console::{Term, style};
use termimad::MadSkin;
use termimad::crossterm::style::Color;

/// Skin for rendering assistant markdown.
pub fn make_skin() -> MadSkin {
    let mut skin = MadSkin::default();
    skin.headers[0].set_fg(Color::Cyan);
    skin.headers[1].set_fg(Color::Blue);
    skin.headers[2].set_fg(Color::Green);
    skin.code_block.set_fg(Color::Yellow);
    skin.inline_code.set_fg(Color::Yellow);
    skin.italic.set_fg(Color::Magenta);
    skin
}

fn content_width(term: &Term) -> usize {
    let terminal_width = term.size().1 as usize;
    std::cmp::min(terminal_width.saturating_sub(4), 100).max(40)
}

/// Print the startup banner: icon, name, description and input hints.
pub fn print_banner(config: &AppConfig) {
    let term = Term::stdout();
    let width = content_width(&term);
    println!(
        "\n{} {}",
        config.app_icon,
        style(&config.app_name).bold().cyan()
    );
    println!("{}", style(&config.app_descr).dim());
    println!("{}", style("─".repeat(width)).dim());
    println!(
        "{}",
        style(format!(
            "Type /help for commands. Queries longer than {} words are truncated.",
            config.max_words_per_query
        ))
        .dim()
    );
}

/// Print one committed message. System messages never reach the
/// transcript display.
pub fn print_message(skin: &MadSkin, message: &Message) {
    match message.role {
        Role::System => {}
        Role::User => {
            let term = Term::stdout();
            let width = content_width(&term);
            println!("\n{}", style("You").bold().cyan());
            for line in wrap_text(&message.content, width) {
                println!("  {}", line);
            }
        }
        Role::Assistant => {
            println!("\n{}", style("Assistant").bold().magenta());
            skin.print_text(&message.content);
        }
    }
}

pub fn print_notice(text: &str) {
    println!("{} {}", style("ℹ").bold().yellow(), style(text).yellow());
}

/// A turn failed; the session continues.
pub fn print_turn_error(err: &ChatError) {
    eprintln!("\n{} {}", style("✗").bold().red(), style(err).red());
}

/// Startup cannot continue.
pub fn print_fatal(err: &ChatError) {
    eprintln!("{} {}", style("✗ Fatal:").bold().red(), style(err).red());
}

fn compose_turn_block(query: &str, partial: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(String::new());
    lines.push(format!("{}", style("You").bold().cyan()));
    for line in wrap_text(query, width) {
        lines.push(format!("  {}", line));
    }
    lines.push(String::new());
    lines.push(format!("{}", style("Assistant").bold().magenta()));
    for line in wrap_text(partial, width) {
        lines.push(format!("  {}", line));
    }
    lines
}

/// Live turn renderer. Every emission erases the previous block and
/// reprints the query plus the reply so far, so the visible text is
/// always the whole turn. The reply is shown raw here; the committed
/// transcript reprints it through the markdown skin.
pub struct LiveEcho {
    term: Term,
    width: usize,
    query: String,
    rendered_lines: usize,
}

impl LiveEcho {
    pub fn new() -> Self {
        let term = Term::stdout();
        let width = content_width(&term);
        Self {
            term,
            width,
            query: String::new(),
            rendered_lines: 0,
        }
    }

    fn repaint(&mut self, partial: &str) {
        let block = compose_turn_block(&self.query, partial, self.width);
        let _ = self.term.clear_last_lines(self.rendered_lines);
        for line in &block {
            let _ = self.term.write_line(line);
        }
        self.rendered_lines = block.len();
    }

    /// Erase the live block, e.g. before reprinting the committed turn
    /// or reporting an error.
    pub fn clear(&mut self) {
        let _ = self.term.clear_last_lines(self.rendered_lines);
        self.rendered_lines = 0;
    }
}

impl TurnView for LiveEcho {
    fn show_query(&mut self, query: &str) {
        if self.query != query {
            self.query = query.to_string();
        }
        if self.rendered_lines == 0 {
            self.repaint("");
        }
    }

    fn show_response(&mut self, partial: &str) {
        self.repaint(partial);
    }
}
