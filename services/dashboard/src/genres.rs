//! Genre frequency aggregation
//!
//! Pure transform over already-fetched top artists: count each genre tag,
//! order by descending frequency. Ties keep first-encountered order, which
//! a stable sort gives for free when the input vector is built in encounter
//! order.

use std::collections::HashMap;

use crate::gateway::Artist;

/// Count genre tags across artists, most frequent first.
pub fn genre_frequencies(artists: &[Artist]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for artist in artists {
        for genre in &artist.genres {
            match counts.get_mut(genre.as_str()) {
                Some(count) => *count += 1,
                None => {
                    counts.insert(genre.as_str(), 1);
                    order.push(genre.as_str());
                }
            }
        }
    }

    let mut frequencies: Vec<(String, usize)> = order
        .into_iter()
        .map(|genre| (genre.to_string(), counts[genre]))
        .collect();
    frequencies.sort_by(|a, b| b.1.cmp(&a.1));
    frequencies
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artist(genres: &[&str]) -> Artist {
        Artist {
            name: "artist".into(),
            genres: genres.iter().map(|g| g.to_string()).collect(),
        }
    }

    #[test]
    fn counts_across_artists() {
        let artists = vec![
            artist(&["indie rock", "shoegaze"]),
            artist(&["indie rock"]),
            artist(&["indie rock", "dream pop"]),
        ];
        let frequencies = genre_frequencies(&artists);
        assert_eq!(frequencies[0], ("indie rock".into(), 3));
    }

    #[test]
    fn sorted_by_descending_frequency() {
        let artists = vec![
            artist(&["jazz"]),
            artist(&["jazz", "funk"]),
            artist(&["jazz", "funk", "soul"]),
        ];
        let frequencies = genre_frequencies(&artists);
        let counts: Vec<usize> = frequencies.iter().map(|(_, c)| *c).collect();
        assert_eq!(counts, vec![3, 2, 1]);
    }

    #[test]
    fn ties_keep_first_encountered_order() {
        let artists = vec![artist(&["ambient", "drone"]), artist(&["techno"])];
        let frequencies = genre_frequencies(&artists);
        assert_eq!(
            frequencies,
            vec![
                ("ambient".into(), 1),
                ("drone".into(), 1),
                ("techno".into(), 1),
            ]
        );
    }

    #[test]
    fn higher_count_outranks_earlier_encounter() {
        let artists = vec![artist(&["ambient"]), artist(&["techno"]), artist(&["techno"])];
        let frequencies = genre_frequencies(&artists);
        assert_eq!(frequencies[0], ("techno".into(), 2));
        assert_eq!(frequencies[1], ("ambient".into(), 1));
    }

    #[test]
    fn no_genres_yields_empty() {
        assert!(genre_frequencies(&[]).is_empty());
        assert!(genre_frequencies(&[artist(&[])]).is_empty());
    }
}
