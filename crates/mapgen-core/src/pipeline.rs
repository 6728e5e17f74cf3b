//! Pipeline orchestrator: reads the grid port once, runs every stage in
//! dependency order, and publishes rainfall, biomes and features at the end.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::Serialize;
use serde_json::{json, Value};

use crate::climate::{self, microclimate};
use crate::config::{resolve_with_report, FeatureKey, ResolvedConfig};
use crate::corridors::{island_hop, land, rivers, sea_lanes, CorridorKind, CorridorSet, LaneGuard};
use crate::ecology::{self, EcologyIndices};
use crate::error::{ConfigValidationError, EngineIntegrationError, GenerationError};
use crate::features::{self, apply_density, tag_floodplains};
use crate::grid::{Biome, GridPort, Surface};
use crate::landmass::coastlines::{self, CoastInputs};
use crate::landmass::{self, islands, margins, TerrainMap};
use crate::story::{self, Motif};
use crate::tags::StoryTags;
use crate::world::{CurrentField, PlateModel, WindField, WorldModel};

// ── Reports ───────────────────────────────────────────────────────────────────

/// One stage's outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageReport {
    pub name: &'static str,
    /// Plots the stage tagged or changed.
    pub tiles: usize,
    /// The stage was asked for something and placed nothing.
    pub degraded: bool,
    /// Skipped by its toggle.
    pub skipped: bool,
    pub elapsed_ms: u64,
}

/// Collects stage reports and emits the per-stage log lines.
struct Timeline {
    reports: Vec<StageReport>,
    timing: bool,
    started: Instant,
}

impl Timeline {
    fn new(timing: bool) -> Self {
        Self { reports: Vec::new(), timing, started: Instant::now() }
    }

    fn start(&mut self, name: &'static str) {
        tracing::debug!(stage = name, "stage started");
        self.started = Instant::now();
    }

    fn finish(&mut self, name: &'static str, tiles: usize, degraded: bool) {
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        if degraded {
            tracing::warn!(stage = name, "stage placed nothing");
        }
        if self.timing {
            tracing::info!(stage = name, tiles, elapsed_ms, "stage finished");
        } else {
            tracing::debug!(stage = name, tiles, "stage finished");
        }
        self.reports.push(StageReport { name, tiles, degraded, skipped: false, elapsed_ms });
    }

    fn motif(&mut self, name: &'static str, motif: Motif) {
        self.finish(name, motif.tiles, motif.degraded());
    }

    fn skip(&mut self, name: &'static str) {
        tracing::debug!(stage = name, "stage disabled");
        self.reports.push(StageReport { name, tiles: 0, degraded: false, skipped: true, elapsed_ms: 0 });
    }
}

// ── Result ────────────────────────────────────────────────────────────────────

/// Everything one run produced. The same rainfall, biomes and features have
/// already been written to the port.
#[derive(Debug, Clone)]
pub struct MapResult {
    pub config: ResolvedConfig,
    pub seed: u64,
    pub terrain: TerrainMap,
    pub plates: PlateModel,
    pub wind: WindField,
    pub currents: CurrentField,
    pub tags: StoryTags,
    pub corridors: CorridorSet,
    pub rainfall: Vec<f64>,
    pub biome: Vec<Biome>,
    pub ecology: EcologyIndices,
    pub feature: Vec<Option<FeatureKey>>,
    pub floodplains: Vec<Vec<usize>>,
    /// Natural wonders the host should place: existing ones, plus one when
    /// `placement.wondersPlusOne` is set.
    pub wonder_target: usize,
    pub stages: Vec<StageReport>,
}

impl MapResult {
    pub fn feature_histogram(&self) -> BTreeMap<&'static str, usize> {
        let mut out = BTreeMap::new();
        for key in self.feature.iter().flatten() {
            *out.entry(key.as_str()).or_insert(0) += 1;
        }
        out
    }

    /// `(min, max, mean)` rainfall over land; all zero without land.
    pub fn land_rainfall_stats(&self) -> (f64, f64, f64) {
        let land: Vec<f64> =
            (0..self.rainfall.len()).filter(|&i| self.terrain.is_land(i)).map(|i| self.rainfall[i]).collect();
        if land.is_empty() {
            return (0.0, 0.0, 0.0);
        }
        let min = land.iter().copied().fold(f64::INFINITY, f64::min);
        let max = land.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (min, max, land.iter().sum::<f64>() / land.len() as f64)
    }

    /// Compact JSON digest of the run.
    pub fn summary(&self) -> Value {
        let (min, max, mean) = self.land_rainfall_stats();
        let dims = self.terrain.dims;
        json!({
            "seed": self.seed,
            "width": dims.width,
            "height": dims.height,
            "landPlots": self.terrain.land_count(),
            "stages": self.stages,
            "tags": self.tags.summary(),
            "corridors": self.corridors.summary(),
            "features": self.feature_histogram(),
            "floodplains": self.floodplains.len(),
            "wonderTarget": self.wonder_target,
            "rainfall": { "min": min, "max": max, "mean": mean },
        })
    }
}

// ── Orchestrator ──────────────────────────────────────────────────────────────

pub struct MapGenerator {
    config: ResolvedConfig,
    seed: u64,
}

impl MapGenerator {
    pub fn new(config: ResolvedConfig, seed: u64) -> Self {
        Self { config, seed }
    }

    /// Resolve `raw` first; unknown closed keys fail before any plot is read.
    pub fn from_raw(raw: &Value, seed: u64) -> Result<Self, ConfigValidationError> {
        let resolution = resolve_with_report(raw)?;
        if !resolution.clamped.is_empty() {
            tracing::debug!(adjusted = resolution.clamped.len(), "config values clamped or defaulted");
        }
        Ok(Self::new(resolution.config, seed))
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Run the full pipeline against `port`.
    ///
    /// Stage order:
    ///   survey, world, landmass, margins, hotspots, rifts, orogeny,
    ///   corridors, coastlines, islands, volcanicPeaks, currents,
    ///   climateBaseline, riverCorridors, swatches, paleo, climateRefine,
    ///   biomes, ecology, features, floodplains, publish
    pub fn generate<P: GridPort + ?Sized>(&self, port: &mut P) -> Result<MapResult, GenerationError> {
        let cfg = &self.config;
        let seed = self.seed;
        let toggles = &cfg.toggles;
        let dir = &cfg.world_model.directionality;
        let mut line = Timeline::new(cfg.dev.timing());
        tracing::info!(seed, "map generation started");

        // ── Survey ──────────────────────────────────────────────────────────
        line.start("survey");
        let surface = Surface::survey(&*port).map_err(|e| EngineIntegrationError::new("survey", e))?;
        let dims = surface.dims;
        line.finish("survey", dims.len(), false);

        // ── World model ─────────────────────────────────────────────────────
        line.start("world");
        let world = if toggles.world_model {
            WorldModel::generate(dims, &surface.latitude, &cfg.world_model, seed)
        } else {
            WorldModel::uniform(dims, &surface.latitude, &cfg.world_model)
        };
        line.finish("world", world.plates.plates.len(), false);

        // ── Landmass ────────────────────────────────────────────────────────
        line.start("landmass");
        let separation = &cfg.world_model.policy.ocean_separation;
        let carved = landmass::carve(
            dims,
            &cfg.landmass,
            (world.enabled && separation.enabled).then_some((separation, &world.plates)),
            seed,
        );
        let mut terrain = carved.terrain;
        line.finish("landmass", terrain.land_count(), terrain.land_count() == 0);

        let mut tags = StoryTags::default();
        line.start("margins");
        margins::tag_margins(&terrain, &cfg.margins, seed, &mut tags.margins);
        line.finish("margins", tags.margins.active.len() + tags.margins.passive.len(), false);

        // ── Story: tectonic motifs ──────────────────────────────────────────
        if toggles.hotspots {
            line.start("hotspots");
            let m = story::tag_hotspots(&terrain, &cfg.story.hotspot, seed, &mut tags.hotspots);
            line.motif("hotspots", m);
        } else {
            line.skip("hotspots");
        }
        if toggles.rifts {
            line.start("rifts");
            let m = story::tag_rifts(&surface, &terrain, &world, &cfg.story.rift, dir, seed, &mut tags.rifts);
            line.motif("rifts", m);
        } else {
            line.skip("rifts");
        }
        if toggles.orogeny {
            line.start("orogeny");
            let m = story::tag_orogeny(&surface, &terrain, &world, &tags.rifts, &cfg.story.orogeny, dir, &mut tags.orogeny);
            line.motif("orogeny", m);
        } else {
            line.skip("orogeny");
        }

        // ── Corridors planned before coastline edits ────────────────────────
        let mut corridors = CorridorSet::default();
        if toggles.corridors {
            line.start("corridors");
            let lanes = sea_lanes::plan(&terrain, &cfg.corridors.sea, &cfg.corridors.policy.sea, dir, &mut corridors);
            let arcs = island_hop::plan(&terrain, &tags.hotspots, &cfg.corridors.island_hop, seed, &mut corridors);
            let belts =
                land::plan(&surface, &terrain, &tags.rifts, &cfg.corridors.land, &cfg.corridors.policy.land, dir, &mut corridors);
            tracing::debug!(lanes, arcs, belts, "corridors planned");
            let degraded = cfg.corridors.sea.max_lanes > 0 && lanes == 0;
            line.finish("corridors", corridors.summary().iter().filter(|(k, _)| k.ends_with("Tiles")).map(|(_, n)| n).sum(), degraded);
        } else {
            line.skip("corridors");
        }

        // ── Coastlines and islands, checked against the sea lanes ──────────
        line.start("coastlines");
        let mut guard = LaneGuard::new(dims, &corridors, &cfg.corridors.policy.sea, cfg.coastlines.min_sea_lane_width);
        let coast = coastlines::ruggedize(
            &mut terrain,
            &CoastInputs {
                hill: &carved.hill,
                margins: &tags.margins,
                world: &world,
                corridors: &corridors,
                kinds: &cfg.corridors.kinds,
                policy: &cfg.world_model.policy,
            },
            &guard,
            &cfg.coastlines,
            seed,
        );
        line.finish("coastlines", coast.bays + coast.fjords, false);

        line.start("islands");
        let isles = islands::add_island_chains(
            &mut terrain,
            &tags.margins,
            &tags.hotspots,
            &corridors,
            cfg.corridors.sea.avoid_radius,
            &mut guard,
            &cfg.islands,
            seed,
        );
        line.finish("islands", isles.raised + isles.shoals, false);

        if toggles.hotspots {
            line.start("volcanicPeaks");
            let peaks = story::surface_volcanic_peaks(&mut terrain, &tags.hotspots, &cfg.story.hotspot, &mut guard, seed);
            line.finish("volcanicPeaks", peaks, false);
        } else {
            line.skip("volcanicPeaks");
        }
        if guard.rejected() > 0 {
            tracing::debug!(rejected = guard.rejected(), "edits rejected by the sea-lane guard");
        }

        line.start("currents");
        let currents = if world.enabled {
            CurrentField::generate(
                dims,
                &surface.latitude,
                &terrain.water_mask(),
                &world.wind,
                &cfg.world_model.currents,
                dir,
                seed,
            )
        } else {
            CurrentField::still(dims)
        };
        line.finish("currents", currents.gyres, false);

        // ── Climate baseline, river corridors, climate motifs ───────────────
        line.start("climateBaseline");
        let mut rain = climate::baseline(&surface, &terrain, &cfg.climate_baseline, seed);
        line.finish("climateBaseline", terrain.land_count(), false);

        if toggles.corridors {
            line.start("riverCorridors");
            let chains = rivers::plan(&surface, &terrain, &cfg.corridors.river, &cfg.corridors.policy.river, seed, &mut corridors);
            line.finish("riverCorridors", corridors.tile_count(CorridorKind::River), cfg.corridors.river.max_chains > 0 && chains == 0);
        } else {
            line.skip("riverCorridors");
        }

        if toggles.swatches {
            line.start("swatches");
            let m = story::apply_swatches(
                &mut rain,
                &surface,
                &terrain,
                &tags.orogeny,
                &cfg.story.swatches,
                dir,
                seed,
                &mut tags.swatches,
            );
            let monsoon = story::apply_monsoon(&mut rain, &surface, &terrain, &world, dir);
            tracing::debug!(monsoon, "monsoon bias applied");
            line.motif("swatches", m);
        } else {
            line.skip("swatches");
        }
        if toggles.paleo {
            line.start("paleo");
            let m = story::apply_paleo(&mut rain, &surface, &terrain, &cfg.story.paleo, seed, &mut tags.paleo);
            line.motif("paleo", m);
        } else {
            line.skip("paleo");
        }

        // ── Climate refinement ──────────────────────────────────────────────
        line.start("climateRefine");
        let passes = climate::refine(&mut rain, &surface, &terrain, &world, &cfg.climate_refine, dir);
        let micro = microclimate::apply(&mut rain, &surface, &terrain, &tags, &cfg.microclimate, &cfg.story.orogeny);
        let current = microclimate::current_humidity(&mut rain, &terrain, &currents, cfg.world_model.policy.current_humidity_bias);
        line.finish("climateRefine", passes.iter().sum::<usize>() + micro + current, false);

        if cfg.dev.story_tags() {
            tracing::info!(tags = ?tags.summary(), corridors = ?corridors.summary(), "story tags");
        }
        if cfg.dev.histogram() {
            let bins = climate::histogram(&rain, |i| terrain.is_land(i));
            tracing::info!(?bins, "land rainfall histogram (0..200, 10 bins)");
        }

        // ── Biomes, ecology, features ───────────────────────────────────────
        line.start("biomes");
        let mut biome = ecology::designate(&surface, &terrain, &rain);
        let nudged = ecology::nudge_biomes(&mut biome, &surface, &terrain, &rain, &tags, &corridors, cfg, seed);
        line.finish("biomes", nudged, false);

        line.start("ecology");
        let eco = ecology::classify(&surface, &terrain, &rain, &biome);
        line.finish("ecology", dims.len(), false);

        line.start("features");
        let mut board = features::place_features(&surface, &terrain, &eco, &cfg.features, seed);
        let extra = apply_density(&mut board, &surface, &terrain, &biome, &rain, &tags, &corridors, cfg, seed);
        tracing::debug!(extra, "density tweaks");
        line.finish("features", board.count(), false);

        line.start("floodplains");
        let floodplains = tag_floodplains(&surface, &terrain, &corridors, cfg);
        line.finish("floodplains", floodplains.iter().map(Vec::len).sum(), false);

        // ── Publish ─────────────────────────────────────────────────────────
        line.start("publish");
        let publish = |e| EngineIntegrationError::new("publish", e);
        for y in 0..dims.height {
            for x in 0..dims.width {
                let i = dims.idx(x, y);
                port.set_rainfall(x, y, rain[i]).map_err(publish)?;
                port.set_biome(x, y, biome[i]).map_err(publish)?;
                port.set_feature(x, y, board.field[i]).map_err(publish)?;
            }
        }
        line.finish("publish", dims.len(), false);

        let wonder_target = surface.wonder.iter().filter(|w| **w).count() + usize::from(cfg.placement.wonders_plus_one);
        tracing::info!(
            land = terrain.land_count(),
            features = board.count(),
            corridors = corridors.corridors.len(),
            "map generation finished"
        );

        Ok(MapResult {
            config: cfg.clone(),
            seed,
            terrain,
            plates: world.plates,
            wind: world.wind,
            currents,
            tags,
            corridors,
            rainfall: rain,
            biome,
            ecology: eco,
            feature: board.field,
            floodplains,
            wonder_target,
            stages: line.reports,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolve;
    use crate::error::GridError;
    use crate::grid::MemoryGrid;
    use serde_json::json;

    fn run(raw: Value, seed: u64) -> (MapResult, MemoryGrid) {
        let mut grid = MemoryGrid::synthetic(seed, 96, 60);
        let result = MapGenerator::from_raw(&raw, seed).unwrap().generate(&mut grid).unwrap();
        (result, grid)
    }

    #[test]
    fn same_seed_same_map() {
        let (a, ga) = run(json!({}), 17);
        let (b, gb) = run(json!({}), 17);
        assert_eq!(a.rainfall, b.rainfall);
        assert_eq!(a.biome, b.biome);
        assert_eq!(a.feature, b.feature);
        assert_eq!(a.tags, b.tags);
        assert_eq!(ga.rainfall, gb.rainfall);
        assert_eq!(ga.features, gb.features);
    }

    #[test]
    fn rainfall_stays_in_bounds_and_is_published() {
        let (result, grid) = run(json!({}), 3);
        assert!(result.rainfall.iter().all(|r| (0.0..=200.0).contains(r)), "rainfall out of range");
        assert_eq!(grid.rainfall, result.rainfall);
        assert_eq!(grid.biomes, result.biome);
        for (i, b) in result.biome.iter().enumerate() {
            assert_eq!(*b == Biome::Marine, result.terrain.is_water(i), "plot {i} biome {b:?}");
        }
    }

    #[test]
    fn disabling_hotspots_leaves_other_stages_running() {
        let (result, _) = run(json!({ "toggles": { "STORY_ENABLE_HOTSPOTS": false } }), 5);
        assert!(result.tags.hotspots.points.is_empty());
        assert!(result.tags.hotspots.paradise.is_empty() && result.tags.hotspots.volcanic.is_empty());
        let hotspots = result.stages.iter().find(|s| s.name == "hotspots").unwrap();
        assert!(hotspots.skipped);
        assert!(result.terrain.land_count() > 0);
        assert!(result.feature.iter().any(|f| f.is_some()), "features still placed");
        assert!(!result.tags.margins.active.is_empty() || !result.tags.margins.passive.is_empty());
    }

    #[test]
    fn every_stage_reports_once_in_order() {
        let (result, _) = run(json!({}), 8);
        let names: Vec<&str> = result.stages.iter().map(|s| s.name).collect();
        assert_eq!(names.first(), Some(&"survey"));
        assert_eq!(names.last(), Some(&"publish"));
        let pos = |n: &str| names.iter().position(|s| *s == n).unwrap();
        assert!(pos("corridors") < pos("coastlines"));
        assert!(pos("climateBaseline") < pos("riverCorridors"));
        assert!(pos("climateRefine") < pos("biomes"));
        assert!(pos("biomes") < pos("features"));
    }

    #[test]
    fn unknown_feature_key_fails_before_the_grid_is_read() {
        let err = MapGenerator::from_raw(&json!({ "features": { "chances": { "FEATURE_BOGUS": 5 } } }), 1)
            .err()
            .unwrap();
        assert!(err.to_string().contains("FEATURE_BOGUS"), "{err}");
    }

    #[test]
    fn summary_carries_the_digest() {
        let (result, _) = run(json!({}), 21);
        let s = result.summary();
        assert_eq!(s["width"], 96);
        assert!(s["stages"].as_array().is_some_and(|a| !a.is_empty()));
        let (min, max, mean) = result.land_rainfall_stats();
        assert!(min <= mean && mean <= max);
        assert_eq!(result.wonder_target, 1, "synthetic grids carry no wonders; plus one by default");
    }

    /// Delegates reads, fails every feature write.
    struct BrokenWrites(MemoryGrid);

    impl GridPort for BrokenWrites {
        fn width(&self) -> usize {
            self.0.width()
        }
        fn height(&self) -> usize {
            self.0.height()
        }
        fn latitude(&self, y: usize) -> Result<f64, GridError> {
            self.0.latitude(y)
        }
        fn elevation(&self, x: usize, y: usize) -> Result<f64, GridError> {
            self.0.elevation(x, y)
        }
        fn engine_rainfall(&self, x: usize, y: usize) -> Result<f64, GridError> {
            self.0.engine_rainfall(x, y)
        }
        fn is_river(&self, x: usize, y: usize) -> Result<bool, GridError> {
            self.0.is_river(x, y)
        }
        fn natural_wonder(&self, x: usize, y: usize) -> Result<bool, GridError> {
            self.0.natural_wonder(x, y)
        }
        fn biome(&self, x: usize, y: usize) -> Result<Biome, GridError> {
            self.0.biome(x, y)
        }
        fn start_positions(&self) -> Result<Vec<(usize, usize)>, GridError> {
            self.0.start_positions()
        }
        fn set_rainfall(&mut self, x: usize, y: usize, rainfall: f64) -> Result<(), GridError> {
            self.0.set_rainfall(x, y, rainfall)
        }
        fn set_biome(&mut self, x: usize, y: usize, biome: Biome) -> Result<(), GridError> {
            self.0.set_biome(x, y, biome)
        }
        fn set_feature(&mut self, _: usize, _: usize, _: Option<FeatureKey>) -> Result<(), GridError> {
            Err(GridError::Backend("feature layer is read-only".into()))
        }
    }

    #[test]
    fn port_failure_names_the_stage() {
        let mut port = BrokenWrites(MemoryGrid::synthetic(2, 48, 30));
        let err = MapGenerator::new(resolve(&json!({})).unwrap(), 2).generate(&mut port).unwrap_err();
        assert_eq!(err.failed_stage(), Some("publish"));
    }

    #[test]
    fn out_of_bounds_start_fails_the_survey() {
        let mut grid = MemoryGrid::synthetic(4, 48, 30);
        grid.starts.push((500, 2));
        let err = MapGenerator::new(resolve(&json!({})).unwrap(), 4).generate(&mut grid).unwrap_err();
        assert_eq!(err.failed_stage(), Some("survey"));
    }
}
