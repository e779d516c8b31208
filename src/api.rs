//! The query engine: one context object owning all query state.
//!
//! `QueryEngine` keeps the draft, the queried coins, the relation expression,
//! the compiled query text and the result set in step. Callers reach that state
//! only through the methods here, which is what keeps the canonical relation
//! text and the visual token row from drifting apart.
//!
//! ## Synchronization
//!
//! Operations that change what the backend should compile (adding or clearing
//! coins, any relation edit, a search type change) end in a *sync*:
//!
//! ```text
//! prune stale refs ─> bind unbound labels ─> cache canonical text ─> CompileRequest { seq, .. }
//! ```
//!
//! Removing a coin does **not** sync. The cached relation text keeps naming the
//! removed coin's old label until something else syncs, or until the caller
//! asks for [`QueryEngine::reconcile_relation`]. [`QueryEngine::stale_references`]
//! shows whether that is the case.
//!
//! The returned requests are dispatched by the caller. Their answers come back
//! through `apply_*_response`; compile answers are matched by sequence number
//! so an old answer never replaces a newer one.

use crate::backend::{
    CompileRequest, CompileResponse, CompileSequencer, DownloadRequest, RecommendationRequest, RecommendationResponse,
    Recommendations, SearchRequest, SearchResponse, SearchType, ServiceRequest,
};
use crate::coin::{Category, Coin, CoinDraft, CoinId, Item, Keyword, Side};
use crate::config::EngineConfig;
use crate::draft::CoinDraftBuilder;
use crate::error::{EngineError, Result};
use crate::input::{DescriptionInput, InputAction, KeyInput};
use crate::query_set::CoinQuerySet;
use crate::relation::{self, Lexeme, RelationExpression, RelationIssue, Token, VisualToken};
use crate::results::ResultSet;
use std::time::Instant;
use tracing::{debug, warn};

fn slot(side: Side) -> usize {
    match side {
        Side::Obverse => 0,
        Side::Reverse => 1,
    }
}

#[derive(Debug)]
pub struct QueryEngine {
    config: EngineConfig,
    builder: CoinDraftBuilder,
    coins: CoinQuerySet,
    relation: RelationExpression,
    relation_text: String,
    search_type: SearchType,
    sequencer: CompileSequencer,
    query_text: String,
    results: ResultSet,
    inputs: [DescriptionInput; 2],
    recommendations: [Recommendations; 2],
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::build(EngineConfig::default())
    }
}

impl QueryEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        let input = DescriptionInput::new(config.debounce(), config.min_query_chars);
        Self {
            builder: CoinDraftBuilder::new(),
            coins: CoinQuerySet::new(),
            relation: RelationExpression::new(),
            relation_text: String::new(),
            search_type: config.search_type,
            sequencer: CompileSequencer::new(),
            query_text: String::new(),
            results: ResultSet::with_page_size(config.page_size),
            inputs: [input.clone(), input],
            recommendations: Default::default(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // --- Draft ------------------------------------------------------------

    pub fn draft(&self) -> &CoinDraft {
        self.builder.draft()
    }

    pub fn add_descriptor(&mut self, side: Side, category: Category, item: Item) {
        self.builder.add_descriptor(side, category, item);
    }

    pub fn remove_last_descriptor(&mut self, side: Side) -> bool {
        self.builder.remove_last_descriptor(side).is_some()
    }

    pub fn add_keyword(&mut self, side: Side, text: &str) -> bool {
        self.builder.add_keyword(side, text)
    }

    pub fn toggle_keyword_negation(&mut self, side: Side, text: &str) -> Option<bool> {
        self.builder.toggle_negation(side, text)
    }

    pub fn remove_keyword(&mut self, side: Side, text: &str) -> Option<Keyword> {
        self.builder.remove_keyword(side, text)
    }

    /// Reset the form: empty draft, no pending lookups, no recommendations.
    pub fn clear_draft(&mut self) {
        self.builder.clear();
        for side in Side::BOTH {
            self.inputs[slot(side)].reset();
            self.recommendations[slot(side)] = Recommendations::default();
        }
    }

    /// Load the coin at `index` into the draft for editing. The coin itself
    /// stays in the set; submitting the draft adds a new coin.
    pub fn edit_coin(&mut self, index: usize) -> bool {
        let Some(coin) = self.coins.get(index).cloned() else { return false };
        self.clear_draft();
        self.builder.load(&coin);
        true
    }

    // --- Recommendations --------------------------------------------------

    /// Feed a released key of `side`'s description field. `text` is the
    /// field content after the key.
    pub fn on_description_key(&mut self, side: Side, key: KeyInput, text: &str, now: Instant) -> InputAction {
        let action = self.inputs[slot(side)].on_key_up(key, text, now);
        match action {
            InputAction::Scheduled => {}
            InputAction::Cleared => self.recommendations[slot(side)] = Recommendations::default(),
            InputAction::RemoveLastDescriptor => {
                self.recommendations[slot(side)] = Recommendations::default();
                if let Some(removed) = self.builder.remove_last_descriptor(side) {
                    debug!(side = side.as_str(), category = %removed.category, "descriptor removed by backspace");
                }
            }
        }
        action
    }

    /// Lookups whose quiet interval has passed, at most one per side.
    pub fn poll_recommendations(&mut self, now: Instant) -> Vec<(Side, RecommendationRequest)> {
        let scope = self.config.scope();
        Side::BOTH
            .into_iter()
            .filter_map(|side| {
                let query = self.inputs[slot(side)].poll(now)?;
                Some((side, RecommendationRequest::new(scope, query)))
            })
            .collect()
    }

    pub fn apply_recommendations(&mut self, side: Side, response: RecommendationResponse) -> bool {
        match response.into_result(RecommendationRequest::ACTION) {
            Ok(result) => {
                let recs = Recommendations::from_result(result);
                debug!(side = side.as_str(), count = recs.len(), "recommendations received");
                self.recommendations[slot(side)] = recs;
                true
            }
            Err(err) => {
                warn!(error = %err, "recommendation lookup failed");
                false
            }
        }
    }

    pub fn recommendations(&self, side: Side) -> &Recommendations {
        &self.recommendations[slot(side)]
    }

    /// Add the `index`-th listed recommendation of `category` as a descriptor.
    pub fn pick_recommendation(&mut self, side: Side, category: Category, index: usize) -> bool {
        let Some(item) = self.recommendations[slot(side)].item(category, index).cloned() else { return false };
        self.builder.add_descriptor(side, category, item);
        self.recommendations[slot(side)] = Recommendations::default();
        self.inputs[slot(side)].reset();
        true
    }

    /// Superclass lookups for the tooltip of a draft descriptor. Verbs have
    /// no hierarchy.
    pub fn hierarchy_requests(&self, side: Side, index: usize) -> Vec<RecommendationRequest> {
        let Some(descriptor) = self.builder.draft().side(side).descriptors.get(index) else { return Vec::new() };
        if descriptor.category.is_verb() {
            return Vec::new();
        }
        descriptor.item.hierarchy_classes().into_iter().map(RecommendationRequest::hierarchy).collect()
    }

    // --- Coins ------------------------------------------------------------

    pub fn coins(&self) -> &CoinQuerySet {
        &self.coins
    }

    /// Finalize the draft into a new coin, append it and extend the relation
    /// with `OR <new coin>`.
    pub fn add_coin_from_draft(&mut self) -> CompileRequest {
        let coin = self.builder.finalize();
        let id = coin.id();
        self.coins.add(coin);
        self.clear_draft();
        self.relation.prune_stale(&self.coins);
        self.relation.on_coin_set_size_change(&self.coins);
        debug!(%id, coins = self.coins.len(), "coin appended to query");
        self.sync()
    }

    pub fn clear_coins(&mut self) -> CompileRequest {
        self.coins.clear();
        self.relation.on_coin_set_size_change(&self.coins);
        self.sync()
    }

    /// Remove the coin at `index`. The relation and its cached text are left
    /// as they are; see [`Self::reconcile_relation`].
    pub fn remove_coin(&mut self, index: usize) -> Option<Coin> {
        let coin = self.coins.remove_at(index)?;
        let stale = self.relation.stale_references(&self.coins).len();
        if stale > 0 {
            debug!(id = %coin.id(), stale, "relation now references a removed coin");
        }
        Some(coin)
    }

    /// Ids the relation still references but the set no longer holds.
    pub fn stale_references(&self) -> Vec<CoinId> {
        self.relation.stale_references(&self.coins)
    }

    /// Drop references to removed coins and recompile.
    pub fn reconcile_relation(&mut self) -> CompileRequest {
        self.sync()
    }

    // --- Relation ---------------------------------------------------------

    pub fn relation(&self) -> &RelationExpression {
        &self.relation
    }

    /// Canonical relation text as of the last sync.
    pub fn relation_text(&self) -> &str {
        &self.relation_text
    }

    /// Visual form of the relation against the current coin set.
    pub fn render_relation(&self) -> Vec<VisualToken> {
        self.relation.render(&self.coins)
    }

    pub fn diagnose_relation(&self) -> Vec<RelationIssue> {
        relation::diagnose(self.relation.tokens(), &self.coins)
    }

    /// Replace the relation with text typed by the user.
    pub fn set_relation_text(&mut self, text: &str) -> CompileRequest {
        self.relation.set_text(text, &self.coins);
        self.sync()
    }

    /// Replace the relation with an edited visual form.
    pub fn apply_visual_edit(&mut self, nodes: &[VisualToken]) -> CompileRequest {
        self.relation.apply_visual(nodes, &self.coins);
        self.sync()
    }

    /// Append an operator (calculator button) or reference.
    pub fn push_relation_token(&mut self, token: Token) -> CompileRequest {
        self.relation.push(token, &self.coins);
        self.sync()
    }

    /// Append a reference to the coin at `index` (catalogue click).
    pub fn push_coin_reference(&mut self, index: usize) -> Option<CompileRequest> {
        let id = self.coins.get(index)?.id();
        Some(self.push_relation_token(Token::bound(id)))
    }

    pub fn insert_relation_token(&mut self, index: usize, token: Token) -> Option<CompileRequest> {
        self.relation.insert(index, token, &self.coins).then(|| self.sync())
    }

    pub fn remove_relation_token(&mut self, index: usize) -> Option<CompileRequest> {
        self.relation.remove(index)?;
        Some(self.sync())
    }

    pub fn clear_relation(&mut self) -> CompileRequest {
        self.relation.clear();
        self.sync()
    }

    // --- Query compilation and search -------------------------------------

    pub fn search_type(&self) -> SearchType {
        self.search_type
    }

    pub fn set_search_type(&mut self, search_type: SearchType) -> CompileRequest {
        self.search_type = search_type;
        self.sync()
    }

    /// Stamp the cached relation text with the next sequence number. Only
    /// `sync` calls this, so the text always matches the coins it ships with.
    fn compile_request(&mut self) -> CompileRequest {
        let coins = self.coins.to_portable_json().unwrap_or_else(|err| {
            warn!(error = %err, "failed to encode coins; sending an empty set");
            "[]".to_string()
        });
        CompileRequest {
            seq: self.sequencer.issue(),
            coins,
            relation: self.relation_text.clone(),
            search_type: self.search_type,
        }
    }

    fn sync(&mut self) -> CompileRequest {
        let pruned = self.relation.prune_stale(&self.coins);
        self.relation.bind(&self.coins);
        self.relation_text = self.relation.serialize(&self.coins);
        let request = self.compile_request();
        debug!(seq = request.seq, pruned, relation = %self.relation_text, "relation synchronized");
        request
    }

    /// Apply the answer to compile request `seq`. Answers older than one
    /// already applied are dropped; failures leave the query text unchanged.
    pub fn apply_compile_response(&mut self, seq: u64, response: CompileResponse) -> bool {
        if !self.sequencer.accept(seq) {
            return false;
        }
        match response.into_result(CompileRequest::ACTION) {
            Ok(query) => {
                self.query_text = query;
                true
            }
            Err(err) => {
                warn!(seq, error = %err, "query compilation failed");
                false
            }
        }
    }

    /// Whether the newest compile request is still unanswered.
    pub fn compile_pending(&self) -> bool {
        self.sequencer.is_pending()
    }

    /// Query text shown in the editor.
    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    /// The user edited the query directly.
    pub fn set_query_text(&mut self, text: impl Into<String>) {
        self.query_text = text.into();
    }

    pub fn search_request(&self) -> SearchRequest {
        SearchRequest { query: self.query_text.clone(), search_type: self.search_type }
    }

    pub fn download_request(&self) -> DownloadRequest {
        DownloadRequest { query: self.query_text.clone(), search_type: self.search_type }
    }

    pub fn apply_search_response(&mut self, response: SearchResponse) -> bool {
        match response.into_result(SearchRequest::ACTION) {
            Ok(records) => {
                self.results.set_results(records);
                true
            }
            Err(err) => {
                warn!(error = %err, "search failed");
                false
            }
        }
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    pub fn results_mut(&mut self) -> &mut ResultSet {
        &mut self.results
    }
}

/// Everything the CLI shows about one relation text.
#[derive(Debug, Clone)]
pub struct RelationReport {
    pub input: String,
    pub coin_count: usize,
    pub lexemes: Vec<Lexeme>,
    pub canonical: String,
    pub visual: Vec<VisualToken>,
    pub issues: Vec<RelationIssue>,
}

/// Largest coin set [`inspect_relation`] will build.
pub const MAX_INSPECT_COINS: usize = 10_000;

/// Tokenize and check `text` against a set of `coin_count` coins.
pub fn inspect_relation(text: &str, coin_count: usize) -> Result<RelationReport> {
    if coin_count > MAX_INSPECT_COINS {
        return Err(EngineError::TooManyCoins { requested: coin_count, max: MAX_INSPECT_COINS });
    }
    let mut builder = CoinDraftBuilder::new();
    let mut coins = CoinQuerySet::new();
    for _ in 0..coin_count {
        coins.add(builder.finalize());
    }
    let expr = RelationExpression::parse(text, &coins);
    Ok(RelationReport {
        input: text.to_string(),
        coin_count,
        lexemes: relation::tokenize(text),
        canonical: expr.serialize(&coins),
        visual: expr.render(&coins),
        issues: relation::diagnose(expr.tokens(), &coins),
    })
}
