/// Comparing sent and received text
use serde::Serialize;
use tracing::info;

/// Result of text comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextComparison {
    pub is_perfect_match: bool,
    pub original_length: usize,
    pub received_length: usize,
    /// Positions where both texts have a character and they differ
    pub mismatched_chars: usize,
    pub first_difference: Option<TextDifference>,
}

/// Details about the first difference found
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextDifference {
    pub position: usize,
    pub original_char: Option<char>,
    pub received_char: Option<char>,
}

impl TextComparison {
    pub fn new(original: &str, received: &str) -> Self {
        let orig_chars: Vec<char> = original.chars().collect();
        let recv_chars: Vec<char> = received.chars().collect();

        let mismatched_chars = orig_chars
            .iter()
            .zip(&recv_chars)
            .filter(|(a, b)| a != b)
            .count();

        // A length difference counts as a difference at the end of the shorter text
        let first_difference = (0..orig_chars.len().max(recv_chars.len()))
            .find(|&i| orig_chars.get(i) != recv_chars.get(i))
            .map(|position| TextDifference {
                position,
                original_char: orig_chars.get(position).copied(),
                received_char: recv_chars.get(position).copied(),
            });

        Self {
            is_perfect_match: first_difference.is_none(),
            original_length: orig_chars.len(),
            received_length: recv_chars.len(),
            mismatched_chars,
            first_difference,
        }
    }

    pub fn log(&self) {
        if self.is_perfect_match {
            info!("Text transmission perfect match");
            return;
        }
        info!("Text transmission has differences");
        info!(
            "Original length: {}, received length: {}, {} mismatched char(s)",
            self.original_length, self.received_length, self.mismatched_chars
        );
        if let Some(diff) = &self.first_difference {
            info!(
                "First difference at position {}: {:?} vs {:?}",
                diff.position, diff.original_char, diff.received_char
            );
        }
    }
}
