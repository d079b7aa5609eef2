use tantivy::tokenizer::{
    LowerCaser,
    RemoveLongFilter,
    SimpleTokenizer,
    StopWordFilter,
    TextAnalyzer,
    Token,
    TokenFilter,
    TokenStream,
    Tokenizer,
};

/// Stop words dropped before stemming. Same list as lunr's English
/// `stopWordFilter`, so the browser client and this index agree on which
/// words carry no signal.
pub const STOP_WORDS: &[&str] = &[
    "a", "able", "about", "across", "after", "all", "almost", "also", "am",
    "among", "an", "and", "any", "are", "as", "at", "be", "because", "been",
    "but", "by", "can", "cannot", "could", "dear", "did", "do", "does",
    "either", "else", "ever", "every", "for", "from", "get", "got", "had",
    "has", "have", "he", "her", "hers", "him", "his", "how", "however", "i",
    "if", "in", "into", "is", "it", "its", "just", "least", "let", "like",
    "likely", "may", "me", "might", "most", "must", "my", "neither", "no",
    "nor", "not", "of", "off", "often", "on", "only", "or", "other", "our",
    "own", "rather", "said", "say", "says", "she", "should", "since", "so",
    "some", "than", "that", "the", "their", "them", "then", "there", "these",
    "they", "this", "tis", "to", "too", "twas", "us", "wants", "was", "we",
    "were", "what", "when", "where", "which", "while", "who", "whom", "why",
    "will", "with", "would", "yet", "you", "your",
];

/// Tokens longer than this many bytes are dropped.
const MAX_TOKEN_LEN: usize = 40;

/// lunr leaves words shorter than this unstemmed.
const MIN_STEM_LEN: usize = 3;

/// Porter (1980) stemming as a tantivy [`TokenFilter`].
///
/// Same algorithm as lunr's `stemmer` pipeline function. Tokens are expected to be lowercased beforehand. Non-ASCII tokens are
/// left as they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct PorterStemmer;

impl TokenFilter for PorterStemmer {
    type Tokenizer<T: Tokenizer> = PorterStemmerFilter<T>;

    fn transform<T: Tokenizer>(self, tokenizer: T) -> PorterStemmerFilter<T> {
        PorterStemmerFilter { inner: tokenizer }
    }
}

#[derive(Clone)]
pub struct PorterStemmerFilter<T> {
    inner: T,
}

impl<T: Tokenizer> Tokenizer for PorterStemmerFilter<T> {
    type TokenStream<'a> = PorterStemmerStream<T::TokenStream<'a>>;

    fn token_stream<'a>(&'a mut self, text: &'a str) -> Self::TokenStream<'a> {
        PorterStemmerStream {
            tail: self.inner.token_stream(text),
        }
    }
}

pub struct PorterStemmerStream<T> {
    tail: T,
}

impl<T: TokenStream> TokenStream for PorterStemmerStream<T> {
    fn advance(&mut self) -> bool {
        if !self.tail.advance() {
            return false;
        }
        let token = self.tail.token_mut();
        if token.text.len() >= MIN_STEM_LEN && token.text.is_ascii() {
            token.text = porter_stemmer::stem(&token.text);
        }
        true
    }

    fn token(&self) -> &Token {
        self.tail.token()
    }

    fn token_mut(&mut self) -> &mut Token {
        self.tail.token_mut()
    }
}

/// Text analysis pipeline shared by indexing and querying.
///
/// Splits on non-alphanumeric characters, drops overlong tokens,
/// lowercases, removes stop words and applies the Porter stemmer.
#[derive(Clone)]
pub struct Analyzer {
    inner: TextAnalyzer,
}

impl Analyzer {
    pub fn english() -> Self {
        let stop_words = STOP_WORDS.iter().map(|w| (*w).to_string());
        let inner = TextAnalyzer::builder(SimpleTokenizer::default())
            .filter(RemoveLongFilter::limit(MAX_TOKEN_LEN))
            .filter(LowerCaser)
            .filter(StopWordFilter::remove(stop_words))
            .filter(PorterStemmer)
            .build();
        Self { inner }
    }

    /// Analyze `text` into index terms, in order, duplicates kept.
    pub fn terms(&mut self, text: &str) -> Vec<String> {
        let mut terms = Vec::new();
        let mut stream = self.inner.token_stream(text);
        stream.process(&mut |token: &Token| terms.push(token.text.clone()));
        terms
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::english()
    }
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer").finish_non_exhaustive()
    }
}
