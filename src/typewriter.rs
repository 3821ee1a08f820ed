//! Typing-text effect: reveals phrases one character at a time, pauses,
//! clears, and moves on to the next phrase.
//!
//! Phrases may carry inline markup; a tag such as `<br>` or `<span ...>` is
//! revealed in a single step so the host never sees half a tag.

#[derive(Clone, Debug, PartialEq)]
pub struct TypewriterOptions {
    pub phrases: Vec<String>,
    pub typing_speed_ms: u32,
    pub pause_ms: u32,
    pub initial_delay_ms: u32,
    pub repeat: bool,
    pub show_cursor: bool,
    pub cursor: String,
    pub start_on_visible: bool,
}

impl Default for TypewriterOptions {
    fn default() -> Self {
        Self {
            phrases: Vec::new(),
            typing_speed_ms: 50,
            pause_ms: 2000,
            initial_delay_ms: 0,
            repeat: true,
            show_cursor: true,
            cursor: "|".into(),
            start_on_visible: true,
        }
    }
}

impl TypewriterOptions {
    /// Build options from `data-*` attributes. `attr` looks an attribute up by
    /// its full name; `fallback_text` is used when `data-text-type` is empty.
    pub fn from_attributes<F>(attr: F, fallback_text: &str) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let text = attr("data-text-type")
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| fallback_text.to_string());
        let phrases = if text.contains(',') {
            text.split(',').map(|p| p.trim().to_string()).collect()
        } else {
            vec![text]
        };
        let not_false = |name: &str| attr(name).map_or(true, |v| v != "false");

        Self {
            phrases,
            typing_speed_ms: positive_ms(attr("data-typing-speed"), defaults.typing_speed_ms),
            pause_ms: positive_ms(attr("data-pause-duration"), defaults.pause_ms),
            initial_delay_ms: positive_ms(attr("data-initial-delay"), defaults.initial_delay_ms),
            repeat: not_false("data-loop"),
            show_cursor: not_false("data-show-cursor"),
            cursor: attr("data-cursor")
                .filter(|c| !c.is_empty())
                .unwrap_or(defaults.cursor),
            start_on_visible: not_false("data-start-on-visible"),
        }
    }
}

/// Zero and unparsable values take the default.
fn positive_ms(raw: Option<String>, default: u32) -> u32 {
    raw.and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

/// What the host should display after one tick and when to tick again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeStep {
    pub text: String,
    /// `None` once the sequence has finished for good.
    pub delay_ms: Option<u32>,
    /// The current phrase is fully shown.
    pub completed: bool,
}

#[derive(Clone, Debug)]
pub struct Typewriter {
    phrases: Vec<String>,
    phrase: usize,
    cursor: usize,
    clearing: bool,
    typing_speed_ms: u32,
    pause_ms: u32,
    repeat: bool,
}

impl Typewriter {
    pub fn new(options: &TypewriterOptions) -> Self {
        let phrases = if options.phrases.is_empty() {
            vec![String::new()]
        } else {
            options.phrases.clone()
        };
        Self {
            phrases,
            phrase: 0,
            cursor: 0,
            clearing: false,
            typing_speed_ms: options.typing_speed_ms,
            pause_ms: options.pause_ms,
            repeat: options.repeat,
        }
    }

    pub fn phrase_index(&self) -> usize {
        self.phrase
    }

    pub fn tick(&mut self) -> TypeStep {
        if self.clearing {
            self.clearing = false;
            self.phrase = (self.phrase + 1) % self.phrases.len();
            self.cursor = 0;
            return TypeStep {
                text: String::new(),
                delay_ms: Some(self.pause_ms / 2),
                completed: false,
            };
        }

        let current = &self.phrases[self.phrase];
        if self.cursor < current.len() {
            self.cursor += next_token_len(&current[self.cursor..]);
            return TypeStep {
                text: current[..self.cursor].to_string(),
                delay_ms: Some(self.typing_speed_ms),
                completed: false,
            };
        }

        let text = current.clone();
        if self.phrases.len() > 1 || self.repeat {
            self.clearing = true;
            TypeStep {
                text,
                delay_ms: Some(self.pause_ms),
                completed: true,
            }
        } else {
            TypeStep {
                text,
                delay_ms: None,
                completed: true,
            }
        }
    }
}

/// Byte length of the next visible step: a whole tag, or one character.
fn next_token_len(rest: &str) -> usize {
    if rest.starts_with('<') {
        if let Some(end) = rest.find('>') {
            return end + 1;
        }
    }
    rest.chars().next().map_or(0, char::len_utf8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn options(phrases: &[&str], repeat: bool) -> TypewriterOptions {
        TypewriterOptions {
            phrases: phrases.iter().map(|p| p.to_string()).collect(),
            repeat,
            ..TypewriterOptions::default()
        }
    }

    #[test]
    fn types_one_character_per_tick() {
        let mut tw = Typewriter::new(&options(&["abc"], false));
        assert_eq!(tw.tick().text, "a");
        assert_eq!(tw.tick().text, "ab");
        let step = tw.tick();
        assert_eq!(step.text, "abc");
        assert_eq!(step.delay_ms, Some(50));
        assert!(!step.completed);
    }

    #[test]
    fn single_phrase_without_loop_ends() {
        let mut tw = Typewriter::new(&options(&["hi"], false));
        tw.tick();
        tw.tick();
        let step = tw.tick();
        assert!(step.completed);
        assert_eq!(step.delay_ms, None);
    }

    #[test]
    fn tags_are_revealed_whole() {
        let mut tw = Typewriter::new(&options(&["a<br>b"], false));
        assert_eq!(tw.tick().text, "a");
        assert_eq!(tw.tick().text, "a<br>");
        assert_eq!(tw.tick().text, "a<br>b");
    }

    #[test]
    fn unterminated_tag_advances_one_char() {
        let mut tw = Typewriter::new(&options(&["<b"], false));
        assert_eq!(tw.tick().text, "<");
        assert_eq!(tw.tick().text, "<b");
    }

    #[test]
    fn multibyte_characters_stay_intact() {
        let mut tw = Typewriter::new(&options(&["hé"], false));
        assert_eq!(tw.tick().text, "h");
        assert_eq!(tw.tick().text, "hé");
    }

    #[test]
    fn cycles_through_phrases() {
        let mut tw = Typewriter::new(&options(&["a", "b"], false));
        assert_eq!(tw.tick().text, "a");
        let done = tw.tick();
        assert!(done.completed);
        assert_eq!(done.delay_ms, Some(2000));
        let cleared = tw.tick();
        assert_eq!(cleared.text, "");
        assert_eq!(cleared.delay_ms, Some(1000));
        assert_eq!(tw.phrase_index(), 1);
        assert_eq!(tw.tick().text, "b");
        tw.tick();
        tw.tick();
        assert_eq!(tw.phrase_index(), 0);
    }

    #[test]
    fn attributes_fill_options() {
        let attrs: HashMap<&str, &str> = [
            ("data-text-type", "Ads, Funnels ,Growth"),
            ("data-typing-speed", "80"),
            ("data-pause-duration", "0"),
            ("data-loop", "false"),
            ("data-cursor", "_"),
        ]
        .into_iter()
        .collect();
        let opts =
            TypewriterOptions::from_attributes(|name| attrs.get(name).map(|v| v.to_string()), "");
        assert_eq!(opts.phrases, vec!["Ads", "Funnels", "Growth"]);
        assert_eq!(opts.typing_speed_ms, 80);
        assert_eq!(opts.pause_ms, 2000);
        assert!(!opts.repeat);
        assert!(opts.show_cursor);
        assert_eq!(opts.cursor, "_");
        assert!(opts.start_on_visible);
    }

    #[test]
    fn empty_attribute_falls_back_to_text_content() {
        let opts = TypewriterOptions::from_attributes(
            |name| (name == "data-text-type").then(String::new),
            "Hello",
        );
        assert_eq!(opts.phrases, vec!["Hello"]);
    }
}
