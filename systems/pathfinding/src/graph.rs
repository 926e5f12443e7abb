//! Dense per-query search graph built over the content bounds.

use encircle_core::{Cell, CellBounds, ObstacleSet, Occupant, OccupancyView, PawnTransition};

/// Neighbour offsets in the fixed order used for relaxation and tie-breaking.
///
/// Indices 0..4 are cardinal moves, 4..8 diagonal moves. An enter-risk flag
/// at index `i` guards a move whose delta is `NEIGHBOR_OFFSETS[i]`.
pub(crate) const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
];

/// Largest node array a single query may allocate.
pub(crate) const MAX_GRAPH_NODES: usize = 1 << 20;

/// Number of player-density rings tracked per node.
pub(crate) const DENSITY_TIERS: usize = 3;

/// Search state of a single cell.
#[derive(Clone, Debug)]
pub(crate) struct CellNode {
    pub(crate) locked: bool,
    pub(crate) checked: bool,
    pub(crate) player_pawn: bool,
    pub(crate) distance: f32,
    pub(crate) player_pawn_tiers: [u8; DENSITY_TIERS],
    pub(crate) enter_risk: [bool; 8],
}

impl Default for CellNode {
    fn default() -> Self {
        Self {
            locked: false,
            checked: false,
            player_pawn: false,
            distance: f32::INFINITY,
            player_pawn_tiers: [0; DENSITY_TIERS],
            enter_risk: [false; 8],
        }
    }
}

/// Inputs required to build a [`CellGraph`].
#[derive(Clone, Copy, Debug)]
pub(crate) struct GraphRequest<'a> {
    pub(crate) bounds: CellBounds,
    pub(crate) start: Cell,
    pub(crate) goal: Cell,
    pub(crate) occupancy: &'a OccupancyView,
    pub(crate) obstacles: ObstacleSet,
    pub(crate) transitions: &'a [PawnTransition],
    pub(crate) enter_risk: bool,
    pub(crate) risk_threshold: u8,
}

/// Row-major node array covering one bounds region.
#[derive(Clone, Debug)]
pub(crate) struct CellGraph {
    bounds: CellBounds,
    width: usize,
    height: usize,
    pub(crate) nodes: Vec<CellNode>,
    start: usize,
    goal: usize,
}

impl CellGraph {
    /// Allocates and seeds the graph.
    ///
    /// Returns `None` when an endpoint lies outside the bounds or the bounds
    /// would need more than [`MAX_GRAPH_NODES`] nodes.
    pub(crate) fn build(request: &GraphRequest<'_>) -> Option<Self> {
        let width = usize::try_from(request.bounds.width()).ok()?;
        let height = usize::try_from(request.bounds.height()).ok()?;
        let node_count = width.checked_mul(height)?;
        if node_count > MAX_GRAPH_NODES {
            return None;
        }

        let mut graph = Self {
            bounds: request.bounds,
            width,
            height,
            nodes: vec![CellNode::default(); node_count],
            start: 0,
            goal: 0,
        };
        graph.start = graph.index_of(request.start)?;
        graph.goal = graph.index_of(request.goal)?;

        for (cell, occupant) in request.occupancy.iter() {
            if !request.obstacles.includes(occupant) {
                continue;
            }
            if let Some(index) = graph.index_of(cell) {
                let node = &mut graph.nodes[index];
                node.locked = true;
                node.player_pawn = matches!(occupant, Occupant::PlayerPawn(_));
            }
        }

        for transition in request.transitions {
            if let Some(index) = graph.index_of(transition.to) {
                graph.nodes[index].locked = true;
            }
            if let Some(index) = graph.index_of(transition.from) {
                graph.nodes[index].locked = false;
            }
        }

        let start = graph.start;
        let goal = graph.goal;
        graph.nodes[start].distance = 0.0;
        graph.nodes[start].locked = false;
        graph.nodes[goal].locked = false;

        graph.count_player_pawns();
        if request.enter_risk {
            graph.assign_enter_risks(request.risk_threshold);
        }

        Some(graph)
    }

    pub(crate) fn bounds(&self) -> CellBounds {
        self.bounds
    }

    pub(crate) fn start(&self) -> usize {
        self.start
    }

    pub(crate) fn goal(&self) -> usize {
        self.goal
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Converts a board cell into a node index.
    pub(crate) fn index_of(&self, cell: Cell) -> Option<usize> {
        let min = self.bounds.min();
        let x = usize::try_from(i64::from(cell.x()) - i64::from(min.x())).ok()?;
        let y = usize::try_from(i64::from(cell.y()) - i64::from(min.y())).ok()?;
        self.local_index(x, y)
    }

    /// Converts a node index back into a board cell.
    pub(crate) fn cell_at(&self, index: usize) -> Cell {
        let x = (index % self.width) as i32;
        let y = (index / self.width) as i32;
        self.bounds.min().offset(x, y)
    }

    /// Index of the node displaced by `(dx, dy)` from `index`, if inside the bounds.
    pub(crate) fn neighbor(&self, index: usize, dx: i32, dy: i32) -> Option<usize> {
        let x = (index % self.width) as i64 + i64::from(dx);
        let y = (index / self.width) as i64 + i64::from(dy);
        self.local_index(usize::try_from(x).ok()?, usize::try_from(y).ok()?)
    }

    fn local_index(&self, x: usize, y: usize) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(x + y * self.width)
        } else {
            None
        }
    }

    fn is_locked(&self, index: usize, dx: i32, dy: i32) -> bool {
        self.neighbor(index, dx, dy)
            .map_or(false, |neighbor| self.nodes[neighbor].locked)
    }

    fn is_player_pawn(&self, index: usize, dx: i32, dy: i32) -> bool {
        self.neighbor(index, dx, dy)
            .map_or(false, |neighbor| self.nodes[neighbor].player_pawn)
    }

    /// Indices of unlocked nodes that are not on the outer margin ring.
    fn open_interior(&self) -> Vec<usize> {
        let mut interior = Vec::new();
        for y in 1..self.height.saturating_sub(1) {
            for x in 1..self.width.saturating_sub(1) {
                let index = x + y * self.width;
                if !self.nodes[index].locked {
                    interior.push(index);
                }
            }
        }
        interior
    }

    /// Counts player pawns on the 1-, 2- and 3-cell rings around each open node.
    fn count_player_pawns(&mut self) {
        for index in self.open_interior() {
            let mut tiers = [0u8; DENSITY_TIERS];
            for (tier, count) in tiers.iter_mut().enumerate() {
                let radius = tier as i32 + 1;
                for dy in -radius..=radius {
                    for dx in -radius..=radius {
                        let on_ring = dx.abs() == radius || dy.abs() == radius;
                        if on_ring && self.is_player_pawn(index, dx, dy) {
                            *count = count.saturating_add(1);
                        }
                    }
                }
            }
            self.nodes[index].player_pawn_tiers = tiers;
        }
    }

    fn assign_enter_risks(&mut self, threshold: u8) {
        for index in self.open_interior() {
            if self.nodes[index].player_pawn_tiers[0] >= threshold {
                let risk = self.enter_risk_at(index);
                self.nodes[index].enter_risk = risk;
            }
        }

        // The mover's own neighbours are never risky to step onto.
        let start = self.start;
        for (dx, dy) in NEIGHBOR_OFFSETS {
            if let Some(neighbor) = self.neighbor(start, dx, dy) {
                if !self.nodes[neighbor].locked {
                    self.nodes[neighbor].enter_risk = [false; 8];
                }
            }
        }
    }

    /// Evaluates which entry directions into `index` walk into a pincer.
    fn enter_risk_at(&self, index: usize) -> [bool; 8] {
        let locked = |dx: i32, dy: i32| self.is_locked(index, dx, dy);
        let mut risk = [false; 8];

        // Cardinal entry between two locked flanks.
        for direction in [0, 2] {
            let (dx, dy) = NEIGHBOR_OFFSETS[direction];
            let (ax, ay) = (dx.abs(), dy.abs());
            risk[direction] = locked(-ay, -ax) && locked(ay, ax);
        }
        risk[1] = risk[0];
        risk[3] = risk[2];

        let pincer = risk[0] || risk[2];
        for flag in &mut risk[4..] {
            *flag = pincer;
        }

        if !pincer {
            for direction in 4..8 {
                let (dx, dy) = NEIGHBOR_OFFSETS[direction];
                let (dx, dy) = (-dx, -dy);
                let side = (dx * dy).signum();
                // Squeezing diagonally between two locked corners.
                risk[direction] |= !locked(dx, dy) && locked(0, dy) && locked(dx, 0);
                // Corridor closing behind the mover.
                risk[direction] |= locked(0, -dy)
                    && locked(-dx, 0)
                    && locked(-1, side)
                    && locked(1, -side);
            }
            risk[1] |= risk[7];
            risk[3] |= risk[7];
            risk[0] |= risk[4];
            risk[2] |= risk[4];
            risk[1] |= risk[5];
            risk[2] |= risk[5];
            risk[0] |= risk[6];
            risk[3] |= risk[6];
        }

        for (direction, (dx, dy)) in NEIGHBOR_OFFSETS.into_iter().enumerate() {
            risk[direction] |= locked(-dx, -dy);
        }

        risk
    }
}
