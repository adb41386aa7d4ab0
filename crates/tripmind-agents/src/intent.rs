use tripmind_models::Intent;

/// Words that ask for current conditions.
pub const WEATHER_KEYWORDS: &[&str] = &[
    "weather",
    "temperature",
    "temp",
    "rain",
    "raining",
    "forecast",
    "climate",
];

/// Words that ask for things to see.
pub const PLACES_KEYWORDS: &[&str] = &[
    "places",
    "place",
    "visit",
    "attractions",
    "attraction",
    "sightseeing",
    "plan",
    "trip",
    "go",
];

/// Filler dropped from the query before it is geocoded.
const FILLER_WORDS: &[&str] = &[
    "a", "about", "an", "and", "any", "are", "around", "at", "can", "do", "does", "for", "going",
    "how", "i", "in", "is", "it", "lets", "like", "me", "my", "near", "of", "please", "s",
    "should", "show", "some", "tell", "the", "there", "to", "what", "whats", "where", "which",
    "will", "with",
];

/// Keyword-based routing. Stateless; the same text always yields the same intent.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    weather_keywords: &'static [&'static str],
    places_keywords: &'static [&'static str],
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self {
            weather_keywords: WEATHER_KEYWORDS,
            places_keywords: PLACES_KEYWORDS,
        }
    }
}

impl IntentClassifier {
    /// Both keyword sets matching, or neither, yields `Intent::Both`.
    pub fn classify(&self, text: &str) -> Intent {
        let tokens = tokenize(text);
        let has_weather = tokens
            .iter()
            .any(|t| self.weather_keywords.contains(&t.as_str()));
        let has_places = tokens
            .iter()
            .any(|t| self.places_keywords.contains(&t.as_str()));

        match (has_weather, has_places) {
            (true, false) => Intent::Weather,
            (false, true) => Intent::Places,
            _ => Intent::Both,
        }
    }

    /// The part of the query naming a place. A query without intent keywords is
    /// taken as the place itself. Otherwise the leading and trailing runs of
    /// keywords and filler are cut; words between the first and last kept word
    /// stay as written, so "weather in Isle of Wight" yields "Isle of Wight".
    /// Falls back to the trimmed query when nothing is left.
    pub fn place_text(&self, text: &str) -> String {
        let trimmed = text.trim();
        if !self.has_keyword(trimmed) {
            return trimmed.to_string();
        }

        let words: Vec<&str> = trimmed.split_whitespace().collect();
        let is_kept = |word: &&str| !self.is_command_word(word);
        let (Some(first), Some(last)) = (
            words.iter().position(is_kept),
            words.iter().rposition(is_kept),
        ) else {
            return trimmed.to_string();
        };

        words[first..=last]
            .join(" ")
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_string()
    }

    fn has_keyword(&self, text: &str) -> bool {
        tokenize(text).iter().any(|t| {
            self.weather_keywords.contains(&t.as_str())
                || self.places_keywords.contains(&t.as_str())
        })
    }

    /// Keyword or filler, ignoring surrounding punctuation and apostrophes.
    fn is_command_word(&self, word: &str) -> bool {
        let folded: String = word
            .trim_matches(|c: char| !c.is_alphanumeric())
            .chars()
            .filter(|c| *c != '\'' && *c != '\u{2019}')
            .collect::<String>()
            .to_lowercase();
        folded.is_empty()
            || self.weather_keywords.contains(&folded.as_str())
            || self.places_keywords.contains(&folded.as_str())
            || FILLER_WORDS.contains(&folded.as_str())
    }
}

/// Lower-case and split on anything that is not a letter or digit.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_only_queries() {
        let classifier = IntentClassifier::default();
        assert_eq!(classifier.classify("weather in Paris"), Intent::Weather);
        assert_eq!(classifier.classify("Will it RAIN in London?"), Intent::Weather);
        assert_eq!(classifier.classify("temperature, Oslo"), Intent::Weather);
    }

    #[test]
    fn places_only_queries() {
        let classifier = IntentClassifier::default();
        assert_eq!(classifier.classify("plan my trip to Bangalore"), Intent::Places);
        assert_eq!(classifier.classify("What places can I visit in Rome?"), Intent::Places);
    }

    #[test]
    fn both_or_neither_yields_both() {
        let classifier = IntentClassifier::default();
        assert_eq!(
            classifier.classify("plan a trip to Tokyo, what's the weather"),
            Intent::Both
        );
        assert_eq!(classifier.classify("Bangalore"), Intent::Both);
        assert_eq!(classifier.classify(""), Intent::Both);
    }

    #[test]
    fn keywords_match_whole_tokens_only() {
        let classifier = IntentClassifier::default();
        // "go" inside "Chicago" and "rain" inside "Bahrain" are not keywords.
        assert_eq!(classifier.classify("Chicago"), Intent::Both);
        assert_eq!(classifier.classify("Bahrain"), Intent::Both);
    }

    #[test]
    fn classification_is_deterministic() {
        let classifier = IntentClassifier::default();
        let first = classifier.classify("weather and attractions in Lisbon");
        for _ in 0..10 {
            assert_eq!(classifier.classify("weather and attractions in Lisbon"), first);
        }
    }

    #[test]
    fn place_text_strips_keywords_and_filler() {
        let classifier = IntentClassifier::default();
        assert_eq!(classifier.place_text("weather in Paris"), "Paris");
        assert_eq!(classifier.place_text("Plan my trip to New York"), "New York");
        assert_eq!(
            classifier.place_text("What's the weather in Tokyo?"),
            "Tokyo"
        );
        assert_eq!(classifier.place_text("What places can I visit in Rome?"), "Rome");
    }

    #[test]
    fn place_text_keeps_plain_names() {
        let classifier = IntentClassifier::default();
        assert_eq!(classifier.place_text("Bangalore"), "Bangalore");
        assert_eq!(classifier.place_text("  Rio de Janeiro "), "Rio de Janeiro");
    }

    #[test]
    fn place_text_keeps_filler_inside_names() {
        let classifier = IntentClassifier::default();
        assert_eq!(classifier.place_text("Isle of Man"), "Isle of Man");
        assert_eq!(classifier.place_text("The Hague"), "The Hague");
        assert_eq!(classifier.place_text("Trinidad and Tobago"), "Trinidad and Tobago");
        assert_eq!(
            classifier.place_text("weather in Isle of Wight"),
            "Isle of Wight"
        );
        assert_eq!(
            classifier.place_text("plan a trip to Tokyo, what's the weather"),
            "Tokyo"
        );
    }

    #[test]
    fn place_text_falls_back_to_query() {
        let classifier = IntentClassifier::default();
        assert_eq!(classifier.place_text("  weather  "), "weather");
    }
}
