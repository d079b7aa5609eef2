use std::{
    collections::{BTreeMap, HashMap, HashSet, hash_map::Entry},
    path::Path,
};

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use tracing::{debug, warn};

use crate::{
    analyzer::Analyzer,
    artifact,
    error::{Error, Result},
    ingestion::DocumentRecord,
};

/// Field names used in the index.
pub mod fields {
    pub const TITLE: &str = "title";
    pub const BODY: &str = "body";
}

/// Relevance multiplier for title matches.
pub const TITLE_BOOST: f64 = 10.0;

/// Relevance multiplier for body matches.
pub const BODY_BOOST: f64 = 1.0;

/// lunr.js release whose serialized layout this index follows.
pub const LUNR_VERSION: &str = "2.3.9";

/// BM25 term frequency saturation.
const K1: f64 = 1.2;

/// BM25 field length normalization.
const B: f64 = 0.75;

const FIELD_NAMES: [&str; 2] = [fields::TITLE, fields::BODY];
const FIELD_BOOSTS: [f64; 2] = [TITLE_BOOST, BODY_BOOST];

/// A single ranked match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub url: String,
    pub score: f64,
}

#[derive(Debug, Clone, Default)]
struct TermPostings {
    /// Position of the term in the vector space (lunr's `_index`).
    index: usize,
    /// Document ordinals containing the term, one ascending list per field.
    docs: Vec<Vec<usize>>,
}

/// Fielded, weighted inverted index over document urls.
///
/// Serializes to the JSON layout `lunr.Index.load` expects.
#[derive(Debug, Clone)]
pub struct SearchIndex {
    fields: Vec<String>,
    /// Document refs in insertion order. A ref's position is its ordinal.
    refs: Vec<String>,
    terms: BTreeMap<String, TermPostings>,
    /// (document ordinal, field ordinal) -> (term index, score), sorted by
    /// term index.
    vectors: BTreeMap<(usize, usize), Vec<(usize, f64)>>,
    analyzer: Analyzer,
}

#[derive(Debug, Default)]
struct FieldStats {
    length: usize,
    /// (term id, frequency) in order of first occurrence.
    frequencies: Vec<(usize, u32)>,
}

/// Accumulates documents and computes the scored index.
#[derive(Debug)]
pub struct IndexBuilder {
    analyzer: Analyzer,
    refs: Vec<String>,
    seen: HashSet<String>,
    docs: Vec<[FieldStats; 2]>,
    term_ids: HashMap<String, usize>,
    term_names: Vec<String>,
    /// Per term id, per field: ordinals of documents containing the term.
    postings: Vec<[Vec<usize>; 2]>,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self {
            analyzer: Analyzer::english(),
            refs: Vec::new(),
            seen: HashSet::new(),
            docs: Vec::new(),
            term_ids: HashMap::new(),
            term_names: Vec::new(),
            postings: Vec::new(),
        }
    }

    /// Add a document. The title and the plain text of the body are
    /// analyzed; the rendered HTML is not looked at.
    ///
    /// Returns `false` (and logs) if a document with the same url was
    /// already added; the first one wins.
    pub fn add(&mut self, record: &DocumentRecord) -> bool {
        if !self.seen.insert(record.url.clone()) {
            warn!(url = %record.url, "duplicate document url, keeping the first");
            return false;
        }
        let ordinal = self.refs.len();

        let title_terms = self.analyzer.terms(&record.title);
        let body_terms = self.analyzer.terms(&record.text);

        let stats = [
            self.field_stats(ordinal, 0, &title_terms),
            self.field_stats(ordinal, 1, &body_terms),
        ];

        self.refs.push(record.url.clone());
        self.docs.push(stats);
        true
    }

    fn field_stats(
        &mut self,
        ordinal: usize,
        field: usize,
        terms: &[String],
    ) -> FieldStats {
        let mut stats = FieldStats {
            length: terms.len(),
            frequencies: Vec::new(),
        };
        let mut positions: HashMap<usize, usize> = HashMap::new();

        for term in terms {
            let id = self.term_id(term);
            match positions.entry(id) {
                Entry::Occupied(pos) => stats.frequencies[*pos.get()].1 += 1,
                Entry::Vacant(pos) => {
                    pos.insert(stats.frequencies.len());
                    stats.frequencies.push((id, 1));
                    self.postings[id][field].push(ordinal);
                }
            }
        }

        stats
    }

    fn term_id(&mut self, term: &str) -> usize {
        if let Some(&id) = self.term_ids.get(term) {
            return id;
        }
        let id = self.term_names.len();
        self.term_ids.insert(term.to_string(), id);
        self.term_names.push(term.to_string());
        self.postings.push(Default::default());
        id
    }

    /// Score every (document, field, term) triple with BM25 and produce the
    /// finished index. An empty builder yields an empty index.
    pub fn build(self) -> SearchIndex {
        let doc_count = self.refs.len();

        let mut average_length = [0.0_f64; 2];
        if doc_count > 0 {
            for (field, avg) in average_length.iter_mut().enumerate() {
                let total: usize =
                    self.docs.iter().map(|d| d[field].length).sum();
                *avg = total as f64 / doc_count as f64;
            }
        }

        let idf: Vec<f64> = self
            .postings
            .iter()
            .map(|per_field| {
                let df: usize = per_field.iter().map(Vec::len).sum();
                inverse_document_frequency(doc_count, df)
            })
            .collect();

        let mut vectors = BTreeMap::new();
        for (ordinal, doc) in self.docs.iter().enumerate() {
            for (field, stats) in doc.iter().enumerate() {
                let mut entries: Vec<(usize, f64)> = stats
                    .frequencies
                    .iter()
                    .map(|&(id, tf)| {
                        let score = bm25(
                            idf[id],
                            tf as f64,
                            stats.length as f64,
                            average_length[field],
                        ) * FIELD_BOOSTS[field];
                        (id, round_score(score))
                    })
                    .collect();
                entries.sort_by_key(|&(id, _)| id);
                vectors.insert((ordinal, field), entries);
            }
        }

        let terms = self
            .term_names
            .into_iter()
            .zip(self.postings)
            .enumerate()
            .map(|(index, (name, per_field))| {
                let postings = TermPostings {
                    index,
                    docs: per_field.into_iter().collect(),
                };
                (name, postings)
            })
            .collect::<BTreeMap<_, _>>();

        debug!(documents = doc_count, terms = terms.len(), "built search index");

        SearchIndex {
            fields: FIELD_NAMES.iter().map(|f| f.to_string()).collect(),
            refs: self.refs,
            terms,
            vectors,
            analyzer: self.analyzer,
        }
    }
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn inverse_document_frequency(doc_count: usize, df: usize) -> f64 {
    let n = doc_count as f64;
    let df = df as f64;
    (1.0 + ((n - df + 0.5) / (df + 0.5)).abs()).ln()
}

fn bm25(idf: f64, tf: f64, field_length: f64, average_length: f64) -> f64 {
    let norm = if average_length > 0.0 {
        field_length / average_length
    } else {
        0.0
    };
    idf * ((K1 + 1.0) * tf) / (K1 * (1.0 - B + B * norm) + tf)
}

fn round_score(score: f64) -> f64 {
    (score * 1000.0).round() / 1000.0
}

impl SearchIndex {
    /// Build an index from converted documents, in order.
    pub fn from_records(records: &[DocumentRecord]) -> Self {
        let mut builder = IndexBuilder::new();
        for record in records {
            builder.add(record);
        }
        builder.build()
    }

    /// Load an index previously written with [`SearchIndex::write`].
    ///
    /// Invalid JSON is [`Error::Json`]; JSON that is not a lunr index is
    /// [`Error::MalformedIndex`].
    pub fn load(path: &Path) -> Result<Self> {
        let raw: SerializedIndex = artifact::read_json(path, "search index")?;
        Self::try_from(raw)
    }

    /// Overwrite `path` with the serialized index.
    pub fn write(&self, path: &Path, pretty: bool) -> Result<()> {
        artifact::write_json(path, self, pretty)
    }

    /// Document urls in insertion order.
    pub fn refs(&self) -> &[String] {
        &self.refs
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Whether `term` (already analyzed) occurs anywhere in the index.
    pub fn contains_term(&self, term: &str) -> bool {
        self.terms.contains_key(term)
    }

    /// Look up a single word in one field.
    ///
    /// The word goes through the same analysis as indexed text, so
    /// `search_field("body", "Running")` finds documents containing "runs".
    pub fn search_field(&self, field: &str, word: &str) -> Result<Vec<SearchHit>> {
        let field_ordinal = self.field_ordinal(field).ok_or_else(|| {
            Error::NotFound {
                kind: "field",
                name: field.to_string(),
            }
        })?;

        let mut scores = HashMap::new();
        let mut analyzer = self.analyzer.clone();
        for term in analyzer.terms(word) {
            self.accumulate(field_ordinal, &term, &mut scores);
        }
        Ok(self.rank(scores))
    }

    /// Run a query over the index.
    ///
    /// The query is a whitespace-separated list of clauses. A clause may be
    /// restricted to one field with a `field:` prefix (`title:setup`);
    /// otherwise it matches every field. Scores of all matching clauses are
    /// summed per document. Results are ordered by descending score, ties by
    /// insertion order.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let mut analyzer = self.analyzer.clone();
        let mut scores = HashMap::new();

        for clause in query.split_whitespace() {
            let (restrict, text) = match clause.split_once(':') {
                Some((name, rest)) => match self.field_ordinal(name) {
                    Some(ordinal) => (Some(ordinal), rest),
                    None => (None, clause),
                },
                None => (None, clause),
            };

            for term in analyzer.terms(text) {
                match restrict {
                    Some(field) => self.accumulate(field, &term, &mut scores),
                    None => {
                        for field in 0..self.fields.len() {
                            self.accumulate(field, &term, &mut scores);
                        }
                    }
                }
            }
        }

        self.rank(scores)
    }

    fn field_ordinal(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == name)
    }

    fn accumulate(
        &self,
        field: usize,
        term: &str,
        scores: &mut HashMap<usize, f64>,
    ) {
        let Some(postings) = self.terms.get(term) else {
            return;
        };
        let Some(docs) = postings.docs.get(field) else {
            return;
        };

        for &doc in docs {
            let score = self
                .vectors
                .get(&(doc, field))
                .and_then(|entries| {
                    entries
                        .binary_search_by_key(&postings.index, |&(id, _)| id)
                        .ok()
                        .map(|pos| entries[pos].1)
                })
                .unwrap_or(0.0);
            *scores.entry(doc).or_insert(0.0) += score;
        }
    }

    fn rank(&self, scores: HashMap<usize, f64>) -> Vec<SearchHit> {
        let mut ranked: Vec<(usize, f64)> = scores.into_iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked
            .into_iter()
            .map(|(doc, score)| SearchHit {
                url: self.refs[doc].clone(),
                score,
            })
            .collect()
    }
}

/// On-disk layout, field for field what lunr 2.x `Index#toJSON` emits.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SerializedIndex {
    version: String,
    fields: Vec<String>,
    /// `["field/ref", [termIndex, score, termIndex, score, ...]]`
    field_vectors: Vec<(String, Vec<Number>)>,
    /// `["term", {"_index": n, "<field>": {"<ref>": {}}}]`, sorted by term
    /// in JavaScript string order.
    inverted_index: Vec<(String, Map<String, Value>)>,
    pipeline: Vec<String>,
}

const INDEX_KEY: &str = "_index";

impl From<&SearchIndex> for SerializedIndex {
    fn from(index: &SearchIndex) -> Self {
        let field_vectors = index
            .vectors
            .iter()
            .map(|(&(doc, field), entries)| {
                let field_ref =
                    format!("{}/{}", index.fields[field], index.refs[doc]);
                let flat = entries
                    .iter()
                    .flat_map(|&(id, score)| {
                        [
                            Number::from(id),
                            Number::from_f64(score).unwrap_or_else(|| 0.into()),
                        ]
                    })
                    .collect();
                (field_ref, flat)
            })
            .collect();

        let mut inverted_index: Vec<(String, Map<String, Value>)> = index
            .terms
            .iter()
            .map(|(term, postings)| {
                let mut posting = Map::new();
                posting.insert(INDEX_KEY.to_string(), postings.index.into());
                for (field, name) in index.fields.iter().enumerate() {
                    let docs = postings
                        .docs
                        .get(field)
                        .map(|docs| {
                            docs.iter()
                                .map(|&doc| {
                                    (index.refs[doc].clone(), Value::Object(Map::new()))
                                })
                                .collect()
                        })
                        .unwrap_or_default();
                    posting.insert(name.clone(), Value::Object(docs));
                }
                (term.clone(), posting)
            })
            .collect();
        // lunr's TokenSet builder rejects terms not in UTF-16 code unit order.
        inverted_index
            .sort_by(|(a, _), (b, _)| a.encode_utf16().cmp(b.encode_utf16()));

        Self {
            version: LUNR_VERSION.to_string(),
            fields: index.fields.clone(),
            field_vectors,
            inverted_index,
            pipeline: vec!["stemmer".to_string()],
        }
    }
}

impl TryFrom<SerializedIndex> for SearchIndex {
    type Error = Error;

    fn try_from(raw: SerializedIndex) -> Result<Self> {
        if raw.version != LUNR_VERSION {
            debug!(version = %raw.version, "loading index from a different lunr version");
        }

        let fields = raw.fields;
        let field_ordinal = |name: &str| {
            fields.iter().position(|f| f == name).ok_or_else(|| {
                Error::MalformedIndex(format!("unknown field '{name}'"))
            })
        };

        let mut refs = Vec::new();
        let mut ordinals: HashMap<String, usize> = HashMap::new();
        let mut vectors = BTreeMap::new();

        for (field_ref, flat) in raw.field_vectors {
            let (name, doc_ref) = field_ref.split_once('/').ok_or_else(|| {
                Error::MalformedIndex(format!("bad field ref '{field_ref}'"))
            })?;
            let field = field_ordinal(name)?;
            let doc = *ordinals.entry(doc_ref.to_string()).or_insert_with(|| {
                refs.push(doc_ref.to_string());
                refs.len() - 1
            });

            if flat.len() % 2 != 0 {
                return Err(Error::MalformedIndex(format!(
                    "odd-length vector for '{field_ref}'"
                )));
            }
            let mut entries = flat
                .chunks_exact(2)
                .map(|pair| -> Result<(usize, f64)> {
                    let id = pair[0].as_u64().ok_or_else(|| {
                        Error::MalformedIndex(format!(
                            "bad term index in '{field_ref}'"
                        ))
                    })?;
                    let score = pair[1].as_f64().ok_or_else(|| {
                        Error::MalformedIndex(format!("bad score in '{field_ref}'"))
                    })?;
                    Ok((id as usize, score))
                })
                .collect::<Result<Vec<_>>>()?;
            entries.sort_by_key(|&(id, _)| id);
            vectors.insert((doc, field), entries);
        }

        let mut terms = BTreeMap::new();
        for (term, posting) in raw.inverted_index {
            let index = posting
                .get(INDEX_KEY)
                .and_then(Value::as_u64)
                .ok_or_else(|| {
                    Error::MalformedIndex(format!("term '{term}' has no _index"))
                })? as usize;

            let mut docs = vec![Vec::new(); fields.len()];
            for (field, name) in fields.iter().enumerate() {
                let Some(by_ref) = posting.get(name).and_then(Value::as_object)
                else {
                    continue;
                };
                for doc_ref in by_ref.keys() {
                    let doc = ordinals.get(doc_ref).copied().ok_or_else(|| {
                        Error::MalformedIndex(format!(
                            "term '{term}' references unknown document '{doc_ref}'"
                        ))
                    })?;
                    docs[field].push(doc);
                }
                docs[field].sort_unstable();
            }

            terms.insert(term, TermPostings { index, docs });
        }

        Ok(Self {
            fields,
            refs,
            terms,
            vectors,
            analyzer: Analyzer::english(),
        })
    }
}

impl Serialize for SearchIndex {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        SerializedIndex::from(self).serialize(serializer)
    }
}
