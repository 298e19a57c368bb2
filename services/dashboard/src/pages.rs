//! Inline HTML rendering for the dashboard pages
//!
//! Deliberately plain: a handful of `format!` templates, no template engine.
//! All provider-supplied strings pass through `escape()` before landing in
//! markup.

use crate::gateway::{Artist, Page, Playlist, Profile, Track, TrackItem};

/// Minimal HTML escaping for text nodes and attribute values.
fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn list(items: impl IntoIterator<Item = String>) -> String {
    let rendered: String = items
        .into_iter()
        .map(|item| format!("<li>{item}</li>"))
        .collect();
    if rendered.is_empty() {
        "<li class=\"empty\">Nothing here yet.</li>".to_string()
    } else {
        rendered
    }
}

fn track_label(track: &Track) -> String {
    match track.artists.first() {
        Some(artist) => format!("{} — {}", escape(&track.name), escape(&artist.name)),
        None => escape(&track.name),
    }
}

/// The main dashboard page.
#[allow(clippy::too_many_arguments)]
pub fn overview(
    profile: &Profile,
    playlists: &Page<Playlist>,
    top_artists: &Page<Artist>,
    genres: &[(String, usize)],
    top_tracks: &Page<Track>,
    saved_tracks: &Page<TrackItem>,
    recently_played: &Page<TrackItem>,
    term: &str,
) -> String {
    let display_name = profile
        .display_name
        .clone()
        .unwrap_or_else(|| profile.id.clone());

    let playlist_items = list(playlists.items.iter().map(|p| escape(&p.name)));
    let artist_items = list(top_artists.items.iter().map(|a| escape(&a.name)));
    let genre_items = list(
        genres
            .iter()
            .map(|(genre, count)| format!("{} ({count})", escape(genre))),
    );
    let track_items = list(top_tracks.items.iter().map(track_label));
    let saved_items = list(saved_tracks.items.iter().map(|i| track_label(&i.track)));
    let recent_items = list(recently_played.items.iter().map(|i| track_label(&i.track)));

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Spotify Dashboard</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 40px; background: #121212; color: #eee; }}
        h1 {{ color: #1db954; }}
        section {{ display: inline-block; vertical-align: top; margin-right: 40px; }}
        .empty {{ color: #888; }}
        .controls button {{ margin-right: 8px; }}
        a {{ color: #1db954; }}
    </style>
</head>
<body>
    <h1>Welcome, {display_name}</h1>
    <p class="controls">
        <button onclick="fetch('/player/previous', {{method: 'POST'}})">&#9664;&#9664;</button>
        <button onclick="fetch('/player/play', {{method: 'POST'}})">&#9654;</button>
        <button onclick="fetch('/player/pause', {{method: 'POST'}})">&#10073;&#10073;</button>
        <button onclick="fetch('/player/next', {{method: 'POST'}})">&#9654;&#9654;</button>
    </p>
    <p>
        Time range:
        <a href="/overview?term=4_weeks">4 weeks</a> |
        <a href="/overview?term=6_months">6 months</a> |
        <a href="/overview?term=lifetime">lifetime</a>
        (showing: {term})
    </p>
    <section><h2>Top Artists</h2><ul>{artist_items}</ul></section>
    <section><h2>Top Genres</h2><ul>{genre_items}</ul></section>
    <section><h2>Top Tracks</h2><ul>{track_items}</ul></section>
    <section><h2>Playlists</h2><ul>{playlist_items}</ul></section>
    <section><h2>Saved Tracks</h2><ul>{saved_items}</ul></section>
    <section><h2>Recently Played</h2><ul>{recent_items}</ul></section>
    <p><a href="/logout">Logout</a></p>
</body>
</html>
"#
    )
}

/// Error page for HTML flows — the provider's message, never a raw error.
pub fn error_page(message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Spotify Dashboard - Error</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 40px; }}
        .error {{ color: #b00; background-color: #ffe6e6; padding: 15px; border-radius: 4px; }}
    </style>
</head>
<body>
    <div class="error"><strong>Something went wrong:</strong> {}</div>
    <p><a href="/overview">Back to dashboard</a> | <a href="/login">Log in again</a></p>
</body>
</html>
"#,
        escape(message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(
            escape(r#"<script>alert("x")</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt;"
        );
    }

    #[test]
    fn overview_renders_names_and_genres() {
        let profile = Profile {
            id: "user1".into(),
            display_name: Some("Alex".into()),
            email: None,
        };
        let artists = Page {
            items: vec![Artist {
                name: "Sault".into(),
                genres: vec!["funk".into()],
            }],
        };
        let empty_tracks: Page<Track> = Page { items: vec![] };
        let empty_items: Page<TrackItem> = Page { items: vec![] };
        let playlists: Page<Playlist> = Page {
            items: vec![Playlist {
                name: "Morning".into(),
            }],
        };
        let genres = vec![("funk".to_string(), 1)];

        let html = overview(
            &profile,
            &playlists,
            &artists,
            &genres,
            &empty_tracks,
            &empty_items,
            &empty_items,
            "6_months",
        );
        assert!(html.contains("Welcome, Alex"));
        assert!(html.contains("Sault"));
        assert!(html.contains("funk (1)"));
        assert!(html.contains("Morning"));
    }

    #[test]
    fn overview_falls_back_to_user_id() {
        let profile = Profile {
            id: "user1".into(),
            display_name: None,
            email: None,
        };
        let empty_artists: Page<Artist> = Page { items: vec![] };
        let empty_tracks: Page<Track> = Page { items: vec![] };
        let empty_items: Page<TrackItem> = Page { items: vec![] };
        let empty_playlists: Page<Playlist> = Page { items: vec![] };

        let html = overview(
            &profile,
            &empty_playlists,
            &empty_artists,
            &[],
            &empty_tracks,
            &empty_items,
            &empty_items,
            "6_months",
        );
        assert!(html.contains("Welcome, user1"));
    }

    #[test]
    fn error_page_escapes_message() {
        let html = error_page("<b>boom</b>");
        assert!(html.contains("&lt;b&gt;boom&lt;/b&gt;"));
        assert!(!html.contains("<b>boom</b>"));
    }
}
