//! Click-to-focus and viewport clamping
//!
//! [`Interaction::table`] is embedded in the rendered page as `GRAPH.focus`; the page
//! script looks up the lit nodes and visible edges there instead of deriving them.
//! The transitions below run against vis-network and `sessionStorage` in the page,
//! with constants taken from [`ViewportPolicy`] and [`SESSION_KEY`].
//!
//! ```text
//!              click node n                    click node m
//! AllVisible ───────────────▶ Focused(n) ───────────────────▶ Focused(m)
//!     ▲                          │
//!     └──── click empty canvas ──┘
//! ```

use serde::Serialize;
use std::collections::HashMap;

/// Session storage key holding the focused node id
pub const SESSION_KEY: &str = "hiclens.focusedNode";

/// Browser-session key/value storage (`sessionStorage` in the page)
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

/// In-memory [`SessionStore`]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FocusState {
    #[default]
    AllVisible,
    Focused(usize),
}

/// What stays lit when a node is focused; embedded in the page as `GRAPH.focus[id]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Neighbourhood {
    /// The focused node and its direct neighbours, ascending
    pub nodes: Vec<usize>,
    /// Ids of the edges incident to the focused node, ascending
    pub edges: Vec<usize>,
}

/// Parse a persisted focus id; only plain decimal digits are accepted
pub fn parse_focus_id(raw: &str) -> Option<usize> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Click handling over a fixed node/edge set
#[derive(Debug, Clone)]
pub struct Interaction {
    state: FocusState,
    /// Indexed by node id
    table: Vec<Neighbourhood>,
    edge_count: usize,
}

impl Interaction {
    /// `neighbours[i]` lists node i's neighbours; `edges[id]` is edge `id` as `(from, to)`
    pub fn new(neighbours: &[Vec<usize>], edges: &[(usize, usize)]) -> Self {
        let mut table: Vec<Neighbourhood> = neighbours
            .iter()
            .enumerate()
            .map(|(node, adj)| {
                let mut nodes = adj.clone();
                nodes.push(node);
                nodes.sort_unstable();
                nodes.dedup();
                Neighbourhood { nodes, edges: Vec::new() }
            })
            .collect();

        for (id, &(a, b)) in edges.iter().enumerate() {
            if let Some(entry) = table.get_mut(a) {
                entry.edges.push(id);
            }
            if b != a {
                if let Some(entry) = table.get_mut(b) {
                    entry.edges.push(id);
                }
            }
        }

        Self {
            state: FocusState::AllVisible,
            table,
            edge_count: edges.len(),
        }
    }

    /// Per-node focus data in node id order
    pub fn table(&self) -> &[Neighbourhood] {
        &self.table
    }

    /// Re-enter the persisted focus, if any, before anything is drawn
    pub fn restore(&mut self, store: &dyn SessionStore) {
        self.state = match store.get(SESSION_KEY).as_deref().and_then(parse_focus_id) {
            Some(node) if node < self.table.len() => FocusState::Focused(node),
            _ => FocusState::AllVisible,
        };
    }

    /// `Some(n)` is a click on node n, `None` a click on empty canvas
    pub fn click(&mut self, target: Option<usize>, store: &mut dyn SessionStore) {
        match target {
            Some(node) if node < self.table.len() => {
                self.state = FocusState::Focused(node);
                store.set(SESSION_KEY, node.to_string());
            }
            Some(_) => {}
            None => {
                if self.state != FocusState::AllVisible {
                    self.state = FocusState::AllVisible;
                    store.remove(SESSION_KEY);
                }
            }
        }
    }

    pub fn state(&self) -> FocusState {
        self.state
    }

    fn focused(&self) -> Option<&Neighbourhood> {
        match self.state {
            FocusState::AllVisible => None,
            FocusState::Focused(n) => self.table.get(n),
        }
    }

    pub fn edge_visible(&self, edge: usize) -> bool {
        match self.focused() {
            None => edge < self.edge_count,
            Some(entry) => entry.edges.binary_search(&edge).is_ok(),
        }
    }

    /// True if the node keeps its own colour; false if it is dimmed
    pub fn node_highlighted(&self, node: usize) -> bool {
        match self.focused() {
            None => node < self.table.len(),
            Some(entry) => entry.nodes.binary_search(&node).is_ok(),
        }
    }

    /// Colour to paint a node given its band colour and the dim colour
    pub fn node_color<'a>(&self, node: usize, original: &'a str, dimmed: &'a str) -> &'a str {
        if self.node_highlighted(node) {
            original
        } else {
            dimmed
        }
    }
}

/// Current camera: zoom scale and view centre in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub scale: f64,
    pub x: f64,
    pub y: f64,
}

/// What the page should do after a zoom or drag
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewCorrection {
    /// Snap the scale back inside the allowed band, keeping position
    Clamp { scale: f64 },
    /// Animate back to the baseline view
    Recenter { to: Viewport, duration_ms: u32 },
}

/// Limits on zoom and pan relative to the fitted baseline view
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewportPolicy {
    /// Highest allowed scale as a multiple of the baseline; 1.0 forbids zooming in
    pub max_zoom_in: f64,
    /// Pan distance (pixels) tolerated at baseline zoom before recentring
    pub drift_threshold_px: f64,
    pub recenter_ms: u32,
}

impl Default for ViewportPolicy {
    fn default() -> Self {
        Self {
            max_zoom_in: 3.0,
            drift_threshold_px: 50.0,
            recenter_ms: 500,
        }
    }
}

impl ViewportPolicy {
    /// Relative tolerance when deciding the view is "at baseline zoom"
    const SCALE_EPSILON: f64 = 1e-3;

    pub fn correct(&self, view: Viewport, baseline: Viewport) -> Option<ViewCorrection> {
        let min = baseline.scale;
        let max = baseline.scale * self.max_zoom_in.max(1.0);

        if view.scale < min || view.scale > max {
            return Some(ViewCorrection::Clamp {
                scale: view.scale.clamp(min, max),
            });
        }

        let at_baseline = (view.scale - baseline.scale).abs() <= baseline.scale * Self::SCALE_EPSILON;
        let drift = ((view.x - baseline.x).powi(2) + (view.y - baseline.y).powi(2)).sqrt();
        if at_baseline && drift > self.drift_threshold_px {
            return Some(ViewCorrection::Recenter {
                to: baseline,
                duration_ms: self.recenter_ms,
            });
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_edges(n: usize, edges: &[(usize, usize)]) -> Interaction {
        let mut neighbours = vec![Vec::new(); n];
        for &(a, b) in edges {
            neighbours[a].push(b);
            neighbours[b].push(a);
        }
        Interaction::new(&neighbours, edges)
    }

    // 4 nodes, edges (0,1) and (0,2), node 3 isolated
    fn example() -> Interaction {
        from_edges(4, &[(0, 1), (0, 2)])
    }

    // ==========================================================================
    // FOCUS STATE MACHINE TESTS
    // ==========================================================================

    #[test]
    fn test_initial_state_all_visible() {
        let it = example();
        assert_eq!(it.state(), FocusState::AllVisible);
        assert!(it.edge_visible(0) && it.edge_visible(1));
        assert!((0..4).all(|n| it.node_highlighted(n)));
    }

    #[test]
    fn test_click_node_focuses_neighbourhood() {
        let mut it = example();
        let mut store = MemoryStore::default();
        it.click(Some(0), &mut store);

        assert_eq!(it.state(), FocusState::Focused(0));
        assert!(it.edge_visible(0));
        assert!(it.edge_visible(1));
        assert!(it.node_highlighted(0) && it.node_highlighted(1) && it.node_highlighted(2));
        assert!(!it.node_highlighted(3));
        assert_eq!(store.get(SESSION_KEY).as_deref(), Some("0"));
    }

    #[test]
    fn test_focus_hides_exactly_non_incident_edges() {
        let mut it = from_edges(5, &[(0, 1), (1, 2), (2, 3), (1, 4)]);
        let mut store = MemoryStore::default();
        it.click(Some(1), &mut store);

        let visible: Vec<bool> = (0..4).map(|e| it.edge_visible(e)).collect();
        assert_eq!(visible, vec![true, true, false, true]);
        let lit: Vec<usize> = (0..5).filter(|&n| it.node_highlighted(n)).collect();
        assert_eq!(lit, vec![0, 1, 2, 4]);
        assert_eq!(it.node_color(3, "#FFD700", "#E8E8E8"), "#E8E8E8");
        assert_eq!(it.node_color(2, "#FFD700", "#E8E8E8"), "#FFD700");
    }

    #[test]
    fn test_click_other_node_replaces_focus() {
        let mut it = example();
        let mut store = MemoryStore::default();
        it.click(Some(0), &mut store);
        it.click(Some(1), &mut store);

        assert_eq!(it.state(), FocusState::Focused(1));
        assert!(it.edge_visible(0));
        assert!(!it.edge_visible(1));
        assert!(!it.node_highlighted(2));
        assert_eq!(store.get(SESSION_KEY).as_deref(), Some("1"));
    }

    #[test]
    fn test_click_isolated_node_hides_all_edges() {
        let mut it = example();
        let mut store = MemoryStore::default();
        it.click(Some(3), &mut store);
        assert!(!it.edge_visible(0) && !it.edge_visible(1));
        let lit: Vec<usize> = (0..4).filter(|&n| it.node_highlighted(n)).collect();
        assert_eq!(lit, vec![3]);
    }

    #[test]
    fn test_click_canvas_restores_and_clears_storage() {
        let mut it = example();
        let mut store = MemoryStore::default();
        it.click(Some(0), &mut store);
        it.click(None, &mut store);

        assert_eq!(it.state(), FocusState::AllVisible);
        assert!(it.edge_visible(0) && it.edge_visible(1));
        assert!((0..4).all(|n| it.node_highlighted(n)));
        assert_eq!(store.get(SESSION_KEY), None);
    }

    #[test]
    fn test_click_unknown_node_is_ignored() {
        let mut it = example();
        let mut store = MemoryStore::default();
        it.click(Some(42), &mut store);
        assert_eq!(it.state(), FocusState::AllVisible);
        assert_eq!(store.get(SESSION_KEY), None);
    }

    #[test]
    fn test_restore_from_session() {
        let mut store = MemoryStore::default();
        store.set(SESSION_KEY, "2".to_string());

        let mut it = example();
        it.restore(&store);
        assert_eq!(it.state(), FocusState::Focused(2));
        assert!(it.edge_visible(1));
        assert!(!it.edge_visible(0));
    }

    #[test]
    fn test_restore_ignores_stale_or_garbage_ids() {
        let mut store = MemoryStore::default();
        store.set(SESSION_KEY, "17".to_string());
        let mut it = example();
        it.restore(&store);
        assert_eq!(it.state(), FocusState::AllVisible);

        store.set(SESSION_KEY, "node-2".to_string());
        it.restore(&store);
        assert_eq!(it.state(), FocusState::AllVisible);

        store.set(SESSION_KEY, String::new());
        it.restore(&store);
        assert_eq!(it.state(), FocusState::AllVisible);

        store.set(SESSION_KEY, "+2".to_string());
        it.restore(&store);
        assert_eq!(it.state(), FocusState::AllVisible);
    }

    #[test]
    fn test_parse_focus_id_digits_only() {
        assert_eq!(parse_focus_id("0"), Some(0));
        assert_eq!(parse_focus_id("12"), Some(12));
        assert_eq!(parse_focus_id(""), None);
        assert_eq!(parse_focus_id(" 1"), None);
        assert_eq!(parse_focus_id("1.0"), None);
        assert_eq!(parse_focus_id("-1"), None);
        assert_eq!(parse_focus_id("99999999999999999999999"), None);
    }

    // ==========================================================================
    // NEIGHBOURHOOD TABLE TESTS
    // ==========================================================================

    #[test]
    fn test_table_lists_self_neighbours_and_incident_edges() {
        let it = from_edges(5, &[(0, 1), (1, 2), (2, 3), (1, 4)]);
        let table = it.table();
        assert_eq!(table.len(), 5);
        assert_eq!(table[1].nodes, vec![0, 1, 2, 4]);
        assert_eq!(table[1].edges, vec![0, 1, 3]);
        assert_eq!(table[3].nodes, vec![2, 3]);
        assert_eq!(table[3].edges, vec![2]);
    }

    #[test]
    fn test_table_isolated_node_lights_only_itself() {
        let it = example();
        assert_eq!(
            it.table()[3],
            Neighbourhood { nodes: vec![3], edges: vec![] }
        );
    }

    // ==========================================================================
    // VIEWPORT POLICY TESTS
    // ==========================================================================

    const BASE: Viewport = Viewport { scale: 0.5, x: 0.0, y: 0.0 };

    #[test]
    fn test_zoom_out_below_baseline_is_clamped() {
        let policy = ViewportPolicy::default();
        let view = Viewport { scale: 0.2, x: 10.0, y: 0.0 };
        assert_eq!(policy.correct(view, BASE), Some(ViewCorrection::Clamp { scale: 0.5 }));
    }

    #[test]
    fn test_zoom_in_band_respected() {
        let policy = ViewportPolicy::default();
        let inside = Viewport { scale: 1.2, x: 300.0, y: 0.0 };
        assert_eq!(policy.correct(inside, BASE), None);

        let beyond = Viewport { scale: 5.0, x: 0.0, y: 0.0 };
        assert_eq!(policy.correct(beyond, BASE), Some(ViewCorrection::Clamp { scale: 1.5 }));
    }

    #[test]
    fn test_no_zoom_in_policy() {
        let policy = ViewportPolicy { max_zoom_in: 1.0, ..ViewportPolicy::default() };
        let view = Viewport { scale: 0.6, x: 0.0, y: 0.0 };
        assert_eq!(policy.correct(view, BASE), Some(ViewCorrection::Clamp { scale: 0.5 }));
    }

    #[test]
    fn test_drift_at_baseline_recenters() {
        let policy = ViewportPolicy::default();
        let near = Viewport { scale: 0.5, x: 30.0, y: 30.0 };
        assert_eq!(policy.correct(near, BASE), None);

        let far = Viewport { scale: 0.5, x: 60.0, y: 0.0 };
        assert_eq!(
            policy.correct(far, BASE),
            Some(ViewCorrection::Recenter { to: BASE, duration_ms: 500 })
        );
    }
}
