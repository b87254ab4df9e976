use crate::util::remap;
use rand::Rng;

/// Characters that close the currently open sentence.
pub const SENTENCE_TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Logical key delivered by the input source.
///
/// Space arrives as `Char(' ')` and acts as a word boundary together with
/// Enter and Tab. Anything that is not a printable character, a boundary or
/// Backspace is ignored by the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Tab,
    Backspace,
}

impl Key {
    pub fn is_word_boundary(&self) -> bool {
        matches!(self, Key::Enter | Key::Tab | Key::Char(' '))
    }
}

/// Timing and anxiety context a new character's style is derived from.
///
/// Style fields freeze at creation; nothing here is stored on the document.
#[derive(Clone, Copy, Debug)]
pub struct StyleContext {
    /// Seconds since the last key-up.
    pub secs_since_activity: f64,
    pub anxiety_level: f64,
}

/// A typed character with its generated visual attributes.
///
/// Everything except `grade` is immutable once assigned; `grade` is driven
/// by the heartbeat wave.
#[derive(Clone, Debug, PartialEq)]
pub struct Character {
    pub letter: char,
    pub opacity: f64,
    pub heading_weight: f64,
    pub sentence_weight: f64,
    pub word_weight: f64,
    pub thin_stroke: f64,
    pub rotation: f64,
    pub seed: f64,
    pub grade: f64,
    pub descender: f64,
}

impl Character {
    pub fn generate<R: Rng>(letter: char, ctx: &StyleContext, rng: &mut R) -> Self {
        let elapsed = ctx.secs_since_activity;

        Self {
            letter,
            opacity: rng.gen::<f64>() * 0.3 + 0.6,
            heading_weight: style_weight(elapsed, 800.0, 1000.0),
            sentence_weight: style_weight(elapsed, 400.0, 450.0),
            word_weight: style_weight(elapsed, 100.0, 150.0),
            thin_stroke: (rng.gen::<f64>() * 110.0 + 25.0).round(),
            rotation: (rng.gen::<f64>() * 20.0 - 10.0).round(),
            seed: rng.gen::<f64>() * 272_727.0,
            grade: 0.0,
            descender: remap(ctx.anxiety_level, 10.0, 35.0, -98.0, -305.0),
        }
    }
}

/// Weight in `min..max` from seconds elapsed since the last activity.
///
/// Recent activity lands near `max`, a second or more of idling near `min`.
/// The composition is deliberately `min + max - remap(..)` with clamping in
/// normalized space, not a direct lerp; the clamped-edge behavior differs.
pub fn style_weight(elapsed_secs: f64, min_weight: f64, max_weight: f64) -> f64 {
    min_weight + max_weight - remap(elapsed_secs, 0.0, 1.0, min_weight, max_weight)
}

/// An ordered run of characters. The empty word is the sentinel placeholder
/// awaiting its first keystroke.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Word {
    pub chars: Vec<Character>,
}

impl Word {
    pub fn sentinel() -> Self {
        Self::default()
    }

    pub fn is_sentinel(&self) -> bool {
        self.chars.is_empty()
    }

    /// True when the last character closes a sentence.
    pub fn ends_sentence(&self) -> bool {
        self.chars
            .last()
            .is_some_and(|c| SENTENCE_TERMINATORS.contains(&c.letter))
    }

    pub fn text(&self) -> String {
        self.chars.iter().map(|c| c.letter).collect()
    }
}

/// An ordered run of words; the last sentence in a document is the open one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sentence {
    pub words: Vec<Word>,
}

impl Sentence {
    pub fn is_closed(&self) -> bool {
        self.words.last().is_some_and(Word::ends_sentence)
    }

    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(Word::text)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// The typed document: flat word history plus the derived sentence grouping.
///
/// `words[0]` is the heading word (the active one) and is excluded from the
/// sentence grouping. The words list is never empty.
#[derive(Clone, Debug)]
pub struct Document {
    pub words: Vec<Word>,
    pub sentences: Vec<Sentence>,
    pub char_counter: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut doc = Self {
            words: vec![Word::sentinel()],
            sentences: Vec::new(),
            char_counter: 0,
        };
        doc.update_sentences();
        doc
    }

    pub fn heading(&self) -> &Word {
        // words is never empty; new() seeds the sentinel
        &self.words[0]
    }

    /// Apply one key to the document. Returns true if anything changed.
    ///
    /// Word boundaries (Enter/Tab/Space) open a new sentinel word; printable
    /// characters extend the newest word; Backspace pops from it. Unhandled
    /// keys are silently ignored. Sentences are regrouped after any change.
    pub fn on_key<R: Rng>(&mut self, key: Key, ctx: &StyleContext, rng: &mut R) -> bool {
        let mutated = if key.is_word_boundary() {
            self.words.push(Word::sentinel());
            true
        } else {
            match key {
                Key::Char(c) if !c.is_control() => {
                    let character = Character::generate(c, ctx, rng);
                    if let Some(word) = self.words.last_mut() {
                        word.chars.push(character);
                    }
                    self.char_counter += 1;
                    true
                }
                Key::Backspace => self.backspace(),
                _ => false,
            }
        };

        if mutated {
            self.update_sentences();
        }
        mutated
    }

    /// Pop the last character of the newest word; popping the last character
    /// leaves the sentinel behind. No-op on an already-empty word.
    fn backspace(&mut self) -> bool {
        match self.words.last_mut() {
            Some(word) if !word.is_sentinel() => {
                word.chars.pop();
                self.char_counter += 1;
                true
            }
            _ => false,
        }
    }

    /// Rebuild the sentence grouping from scratch.
    ///
    /// Scans words[1..] (the heading word is not part of any sentence) and
    /// closes a sentence whenever a word ends with a terminator. The final
    /// sentence is always the open one, possibly empty.
    pub fn update_sentences(&mut self) {
        let mut sentences = Vec::new();
        let mut open = Sentence::default();

        for word in self.words.iter().skip(1) {
            open.words.push(word.clone());

            if word.ends_sentence() {
                sentences.push(std::mem::take(&mut open));
            }
        }

        sentences.push(open);
        self.sentences = sentences;
    }

    /// Sentences that have at least one word (the trailing open sentence may
    /// be empty and must never be sampled from).
    pub fn emittable_sentences(&self) -> Vec<&Sentence> {
        self.sentences
            .iter()
            .filter(|s| !s.words.is_empty())
            .collect()
    }

    /// Assign `grade` to every character, in both the word history and the
    /// derived sentence view.
    pub fn set_all_grades(&mut self, grade: f64) {
        for word in &mut self.words {
            for c in &mut word.chars {
                c.grade = grade;
            }
        }
        for sentence in &mut self.sentences {
            for word in &mut sentence.words {
                for c in &mut word.chars {
                    c.grade = grade;
                }
            }
        }
    }
}
