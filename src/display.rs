use colored::Colorize;

use crate::client::{NewPost, Post};

pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message.green());
}

/// Red status line on stdout, for states that are not errors.
pub fn negative(message: &str) {
    println!("{} {}", "✗".red(), message.red());
}

pub fn failure(message: &str) {
    eprintln!("{} {}", "✗".red(), message.red());
}

/// One numbered entry of `bookmarks list`.
pub fn format_post(index: usize, post: &Post) -> String {
    let heading = format!("{}. {}", index, post.title());
    let heading = if post.toread {
        heading.bright_white().bold().to_string()
    } else {
        heading
    };

    let mut lines = vec![heading, format!("   URL: {}", post.href)];

    if !post.tags.is_empty() {
        lines.push(format!("   Tags: {}", post.tags.join(", ")));
    }

    let mut status = Vec::new();
    if post.is_private() {
        status.push("[Private]");
    }
    if post.toread {
        status.push("[To Read]");
    }
    if !status.is_empty() {
        lines.push(format!("   Status: {}", status.join(" ")));
    }

    lines.join("\n")
}

pub fn print_posts(posts: &[Post]) {
    if posts.is_empty() {
        println!("No bookmarks found.");
        return;
    }

    println!("Found {} bookmarks:", posts.len());
    for (i, post) in posts.iter().enumerate() {
        println!("{}\n", format_post(i + 1, post));
    }
}

pub fn format_reading_entry(index: usize, post: &Post) -> String {
    format!("{}: Title: {}, URL: {}", index, post.title(), post.href)
}

pub fn print_reading_list(posts: &[Post]) {
    if posts.is_empty() {
        println!("Your reading list is empty.");
        return;
    }

    for (i, post) in posts.iter().enumerate() {
        println!("{}", format_reading_entry(i + 1, post));
    }
}

/// Summary of what was sent to `/posts/add`.
pub fn format_new_post(post: &NewPost) -> String {
    let mut lines = vec![format!("  URL: {}", post.url), format!("  Title: {}", post.title)];
    if !post.tags.is_empty() {
        lines.push(format!("  Tags: {}", post.tags.join(", ")));
    }
    if let Some(note) = post.note.as_deref().filter(|n| !n.is_empty()) {
        lines.push(format!("  Note: {}", note));
    }
    lines.push(format!(
        "  Visibility: {}",
        if post.private { "Private" } else { "Public" }
    ));
    if post.to_read {
        lines.push("  Marked as: To Read".to_string());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(toread: bool, shared: bool, tags: &[&str]) -> Post {
        Post {
            href: "https://example.com".to_string(),
            description: "Example".to_string(),
            extended: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            shared,
            toread,
            time: None,
            hash: None,
        }
    }

    #[test]
    fn plain_post_has_no_status_line() {
        colored::control::set_override(false);
        let text = format_post(1, &sample(false, true, &[]));
        assert_eq!(text, "1. Example\n   URL: https://example.com");
    }

    #[test]
    fn private_to_read_post_lists_tags_and_status() {
        colored::control::set_override(false);
        let text = format_post(3, &sample(true, false, &["rust", "cli"]));
        assert_eq!(
            text,
            "3. Example\n   URL: https://example.com\n   Tags: rust, cli\n   Status: [Private] [To Read]"
        );
    }

    #[test]
    fn reading_entry_format() {
        assert_eq!(
            format_reading_entry(2, &sample(true, true, &[])),
            "2: Title: Example, URL: https://example.com"
        );
    }

    #[test]
    fn new_post_summary() {
        let post = NewPost {
            url: "https://example.com".to_string(),
            title: "Example".to_string(),
            note: None,
            tags: vec!["a".to_string()],
            private: true,
            to_read: true,
            replace: false,
        };
        assert_eq!(
            format_new_post(&post),
            "  URL: https://example.com\n  Title: Example\n  Tags: a\n  Visibility: Private\n  Marked as: To Read"
        );
    }
}
