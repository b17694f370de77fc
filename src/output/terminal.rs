// Colored terminal output for samples and cluster listings.
//
// Highlight markers in the sampled text are rendered as bold yellow spans
// instead of being printed literally.

use colored::Colorize;

use crate::dataset::ClusterSize;
use crate::keywords::Marker;
use crate::sampler::ClusterSample;

/// Display a sample: one block per example with its title and highlighted text.
///
/// `max_chars` limits how much of each text is shown (`None` shows everything).
pub fn display_sample(sample: &ClusterSample, marker: &Marker, max_chars: Option<usize>) {
    println!(
        "\n{}",
        format!(
            "=== Topic `{}`: {} examples compared (cluster of {}) ===",
            sample.topic,
            sample.records.len(),
            sample.cluster_size
        )
        .bold()
    );

    if sample.common_keywords.is_empty() {
        println!("  Shared keywords: {}", "none".dimmed());
    } else {
        println!(
            "  Shared keywords: {}",
            sample.common_keywords.join(", ").yellow()
        );
    }
    println!();

    for (i, sampled) in sample.records.iter().enumerate() {
        println!("  {}", format!("Example {}", i + 1).bold());
        let title = sampled.record.op_title().unwrap_or_default();
        if !title.is_empty() {
            println!("  {}", title.italic());
        }
        println!("  {}", render_marked(&sampled.highlighted, marker, max_chars));
        println!();
    }
}

/// Display every cluster with its size, marking the ones eligible for sampling.
pub fn display_clusters(clusters: &[ClusterSize], min_cluster_size: usize) {
    if clusters.is_empty() {
        println!("No clusters found. Is the dataset empty after filtering?");
        return;
    }

    let eligible = clusters
        .iter()
        .filter(|c| c.size >= min_cluster_size)
        .count();

    println!(
        "\n{}",
        format!("=== Topic Clusters ({} total) ===", clusters.len()).bold()
    );
    println!();
    println!(
        "  {:<20} {:>8}  {}",
        "Topic".dimmed(),
        "Records".dimmed(),
        "Eligible".dimmed()
    );
    println!("  {}", "-".repeat(40).dimmed());

    for cluster in clusters {
        let mark = if cluster.size >= min_cluster_size {
            "yes".green()
        } else {
            "no".dimmed()
        };
        println!("  {:<20} {:>8}  {}", cluster.topic, cluster.size, mark);
    }

    println!();
    if eligible == 0 {
        println!(
            "  {} no cluster has at least {} records",
            "!".red().bold(),
            min_cluster_size
        );
    } else {
        println!(
            "  {} of {} clusters have at least {} records",
            eligible,
            clusters.len(),
            min_cluster_size
        );
    }
}

/// Render marked text for the terminal, optionally clipped to `max_chars`.
pub fn render_marked(text: &str, marker: &Marker, max_chars: Option<usize>) -> String {
    let segments = marker.segments(text);
    let (clipped, truncated) = match max_chars {
        Some(limit) => clip_segments(&segments, limit),
        None => (
            segments.iter().map(|(hl, s)| (*hl, s.to_string())).collect(),
            false,
        ),
    };

    let mut out = String::new();
    for (highlighted, segment) in clipped {
        if highlighted {
            out.push_str(&segment.bold().yellow().to_string());
        } else {
            out.push_str(&segment);
        }
    }
    if truncated {
        out.push_str("...");
    }
    out
}

/// Keep at most `max_chars` characters across all segments.
///
/// Returns the kept segments and whether anything was cut.
pub fn clip_segments(segments: &[(bool, &str)], max_chars: usize) -> (Vec<(bool, String)>, bool) {
    let mut remaining = max_chars;
    let mut kept = Vec::new();

    for (highlighted, segment) in segments {
        let len = segment.chars().count();
        if len <= remaining {
            kept.push((*highlighted, segment.to_string()));
            remaining -= len;
        } else {
            if remaining > 0 {
                kept.push((*highlighted, segment.chars().take(remaining).collect()));
            }
            return (kept, true);
        }
    }
    (kept, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_segments_within_budget() {
        let segs = [(false, "the "), (true, "cloud"), (false, " grows")];
        let (kept, truncated) = clip_segments(&segs, 100);
        assert!(!truncated);
        assert_eq!(kept.len(), 3);
    }

    #[test]
    fn test_clip_segments_cuts_inside_highlight() {
        let segs = [(false, "the "), (true, "cloud"), (false, " grows")];
        let (kept, truncated) = clip_segments(&segs, 6);
        assert!(truncated);
        assert_eq!(
            kept,
            vec![(false, "the ".to_string()), (true, "cl".to_string())]
        );
    }

    #[test]
    fn test_render_marked_plain_when_colors_off() {
        colored::control::set_override(false);
        let out = render_marked("a <mark>cloud</mark> é", &Marker::default(), None);
        assert_eq!(out, "a cloud é");
        let out = render_marked("a <mark>cloud</mark> é", &Marker::default(), Some(4));
        assert_eq!(out, "a cl...");
    }

    #[test]
    fn test_render_marked_clips_on_char_boundaries() {
        colored::control::set_override(false);
        let out = render_marked("café 🚀 rockets", &Marker::default(), Some(6));
        assert_eq!(out, "café 🚀...");
        let out = render_marked("café", &Marker::default(), Some(4));
        assert_eq!(out, "café");
    }
}
