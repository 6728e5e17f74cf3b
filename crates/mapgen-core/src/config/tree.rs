//! The full default tree for a map config.

use serde_json::json;

use super::features;
use super::schema::{
    abs_lat, choice, closed, count, degrees, flag, group, int, list, num, percent, rain, ratio, tagged,
    tuple, weight, Node,
};

pub(crate) fn map_schema() -> Node {
    group(vec![
        ("toggles", toggles()),
        ("story", story()),
        ("microclimate", microclimate()),
        ("corridors", corridors()),
        ("landmass", landmass()),
        ("coastlines", coastlines()),
        ("margins", margins()),
        ("islands", islands()),
        ("climateBaseline", climate_baseline()),
        ("climateRefine", climate_refine()),
        ("biomes", biomes()),
        ("featuresDensity", features_density()),
        ("placement", placement()),
        ("features", features::schema()),
        ("dev", dev()),
        ("worldModel", world_model()),
    ])
}

fn toggles() -> Node {
    group(vec![
        ("STORY_ENABLE_HOTSPOTS", flag(true)),
        ("STORY_ENABLE_RIFTS", flag(true)),
        ("STORY_ENABLE_OROGENY", flag(true)),
        ("STORY_ENABLE_SWATCHES", flag(true)),
        ("STORY_ENABLE_PALEO", flag(true)),
        ("STORY_ENABLE_CORRIDORS", flag(true)),
        ("STORY_ENABLE_WORLDMODEL", flag(true)),
    ])
}

// ── Story ─────────────────────────────────────────────────────────────────────

fn story() -> Node {
    group(vec![
        (
            "hotspot",
            group(vec![
                ("maxTrails", count(12)),
                ("steps", count(15)),
                ("stepLen", count(2).min(1.0)),
                ("minDistFromLand", count(5)),
                ("minTrailSeparation", count(12)),
                ("paradiseBias", weight(2.0)),
                ("volcanicBias", weight(1.0)),
                ("volcanicPeakChance", ratio(0.7)),
            ]),
        ),
        (
            "rift",
            group(vec![
                ("maxRiftsPerMap", count(3)),
                ("lineSteps", count(18)),
                ("stepLen", count(2).min(1.0)),
                ("shoulderWidth", count(1)),
            ]),
        ),
        (
            "orogeny",
            group(vec![
                ("beltMaxPerContinent", count(2)),
                ("beltMinLength", count(30)),
                ("radius", count(2)),
                ("windwardBoost", rain(5.0)),
                ("leeDrynessAmplifier", weight(1.2)),
            ]),
        ),
        ("swatches", swatches()),
        ("paleo", paleo()),
    ])
}

fn swatches() -> Node {
    let known = vec![
        (
            "macroDesertBelt",
            group(vec![
                ("weight", weight(8.0)),
                ("latitudeCenterDeg", abs_lat(20.0)),
                ("halfWidthDeg", abs_lat(12.0)),
                ("drynessDelta", rain(28.0)),
                ("bleedRadius", count(3)),
            ]),
        ),
        (
            "equatorialRainbelt",
            group(vec![
                ("weight", weight(3.0)),
                ("latitudeCenterDeg", abs_lat(0.0)),
                ("halfWidthDeg", abs_lat(10.0)),
                ("wetnessDelta", rain(24.0)),
                ("bleedRadius", count(3)),
            ]),
        ),
        (
            "rainforestArchipelago",
            group(vec![
                ("weight", weight(7.0)),
                ("islandBias", weight(2.0)),
                ("reefBias", weight(1.0)),
                ("wetnessDelta", rain(18.0)),
                ("bleedRadius", count(3)),
            ]),
        ),
        (
            "mountainForests",
            group(vec![
                ("weight", weight(2.0)),
                ("coupleToOrogeny", flag(true)),
                ("windwardBonus", rain(6.0)),
                ("leePenalty", rain(2.0)),
                ("bleedRadius", count(3)),
            ]),
        ),
        (
            "greatPlains",
            group(vec![
                ("weight", weight(5.0)),
                ("latitudeCenterDeg", abs_lat(45.0)),
                ("halfWidthDeg", abs_lat(8.0)),
                ("dryDelta", rain(12.0)),
                ("lowlandMaxElevation", num(300.0)),
                ("bleedRadius", count(4)),
            ]),
        ),
    ];
    let custom = group(vec![
        ("weight", weight(1.0)),
        ("latitudeCenterDeg", abs_lat(0.0)),
        ("halfWidthDeg", abs_lat(10.0)),
        ("wetnessDelta", rain(0.0)),
        ("drynessDelta", rain(0.0)),
        ("bleedRadius", count(3)),
    ]);

    group(vec![
        ("maxPerMap", count(7)),
        ("forceAtLeastOne", flag(true)),
        (
            "sizeScaling",
            group(vec![("widthMulSqrt", weight(0.3)), ("lengthMulSqrt", weight(0.4))]),
        ),
        ("types", tagged("swatch", known, "custom", custom)),
    ])
}

fn paleo() -> Node {
    group(vec![
        ("maxDeltas", count(4)),
        ("deltaFanRadius", count(1)),
        ("deltaMarshChance", ratio(0.35)),
        ("maxOxbows", count(6)),
        ("oxbowElevationMax", num(580.0)),
        ("maxFossilChannels", count(12)),
        ("fossilChannelLengthTiles", count(12)),
        ("fossilChannelStep", count(2).min(1.0)),
        ("fossilChannelHumidity", rain(6.0)),
        ("fossilChannelMinDistanceFromCurrentRivers", count(4)),
        ("minDistanceFromStarts", count(7)),
        ("sizeScaling", group(vec![("lengthMulSqrt", weight(0.7))])),
        (
            "elevationCarving",
            group(vec![
                ("enableCanyonRim", flag(true)),
                ("rimWidth", count(4)),
                ("canyonDryBonus", rain(3.0)),
                ("bluffWetReduction", rain(0.0)),
            ]),
        ),
    ])
}

fn microclimate() -> Node {
    group(vec![
        (
            "rainfall",
            group(vec![
                ("riftBoost", rain(8.0)),
                ("riftRadius", count(2)),
                ("paradiseDelta", rain(6.0)),
                ("volcanicDelta", rain(8.0)),
            ]),
        ),
        (
            "features",
            group(vec![
                ("paradiseReefChance", percent(23.0)),
                ("volcanicForestChance", percent(27.0)),
                ("volcanicTaigaChance", percent(25.0)),
            ]),
        ),
    ])
}

// ── Corridors ─────────────────────────────────────────────────────────────────

const STYLE_BIOMES: &[(&str, f64)] = &[
    ("desert", 0.0),
    ("plains", 0.0),
    ("grassland", 0.0),
    ("tundra", 0.0),
    ("tropical", 0.0),
    ("snow", 0.0),
];

const STYLE_FEATURES: &[(&str, f64)] = &[("reefBias", 0.0), ("floodplainBias", 0.0), ("forestBias", 0.0)];

const STYLE_EDGE: &[(&str, f64)] = &[
    ("cliffsChance", 0.0),
    ("fjordChance", 0.0),
    ("bayCarveMultiplier", 1.0),
    ("shelfReefMultiplier", 1.0),
    ("mountainRimChance", 0.0),
    ("forestRimChance", 0.0),
    ("hillRimChance", 0.0),
    ("escarpmentChance", 0.0),
];

fn keyed(what: &'static str, known: &[(&'static str, f64)], overrides: &[(&str, f64)]) -> Node {
    closed(
        what,
        known
            .iter()
            .map(|(key, default)| {
                let value = overrides
                    .iter()
                    .find(|(name, _)| name == key)
                    .map_or(*default, |(_, v)| *v);
                (*key, weight(value))
            })
            .collect(),
    )
}

fn style(biomes: &[(&str, f64)], features: &[(&str, f64)], edge: &[(&str, f64)]) -> Node {
    group(vec![
        ("biomes", keyed("biome", STYLE_BIOMES, biomes)),
        ("features", keyed("feature bias", STYLE_FEATURES, features)),
        ("edge", keyed("edge", STYLE_EDGE, edge)),
    ])
}

fn styles(known: Vec<(&'static str, Node)>) -> Node {
    group(vec![("styles", tagged("corridor style", known, "custom", style(&[], &[], &[])))])
}

fn corridors() -> Node {
    let kinds = group(vec![
        (
            "sea",
            styles(vec![
                (
                    "ocean",
                    style(&[], &[("reefBias", 0.1)], &[("cliffsChance", 0.15), ("fjordChance", 0.1)]),
                ),
                (
                    "coastal",
                    style(
                        &[],
                        &[("reefBias", 0.2)],
                        &[("cliffsChance", 0.25), ("bayCarveMultiplier", 1.15)],
                    ),
                ),
            ]),
        ),
        (
            "islandHop",
            styles(vec![(
                "archipelago",
                style(&[], &[("reefBias", 0.5)], &[("shelfReefMultiplier", 1.25)]),
            )]),
        ),
        (
            "land",
            styles(vec![
                (
                    "desertBelt",
                    style(
                        &[("desert", 0.7), ("plains", 0.25), ("grassland", 0.1), ("tundra", 0.05)],
                        &[],
                        &[("mountainRimChance", 0.4), ("forestRimChance", 0.1)],
                    ),
                ),
                (
                    "plainsBelt",
                    style(
                        &[("plains", 0.55), ("grassland", 0.3), ("desert", 0.1), ("tundra", 0.05)],
                        &[],
                        &[("forestRimChance", 0.1), ("hillRimChance", 0.08)],
                    ),
                ),
                (
                    "grasslandBelt",
                    style(
                        &[("grassland", 0.6), ("plains", 0.25), ("tropical", 0.1), ("tundra", 0.05)],
                        &[],
                        &[("forestRimChance", 0.15), ("hillRimChance", 0.05)],
                    ),
                ),
                (
                    "canyon",
                    style(
                        &[("desert", 0.45), ("plains", 0.3), ("grassland", 0.15), ("tundra", 0.1)],
                        &[],
                        &[("cliffsChance", 0.6), ("mountainRimChance", 0.12)],
                    ),
                ),
                (
                    "plateau",
                    style(
                        &[("plains", 0.4), ("grassland", 0.35), ("desert", 0.15), ("tundra", 0.1)],
                        &[],
                        &[("escarpmentChance", 0.71), ("mountainRimChance", 0.08)],
                    ),
                ),
                (
                    "flatMtn",
                    style(
                        &[("grassland", 0.35), ("plains", 0.3), ("tundra", 0.2), ("desert", 0.15)],
                        &[],
                        &[("mountainRimChance", 0.6), ("forestRimChance", 0.3)],
                    ),
                ),
            ]),
        ),
        (
            "river",
            styles(vec![(
                "riverChain",
                style(
                    &[("grassland", 0.6), ("plains", 0.25), ("tropical", 0.15)],
                    &[("floodplainBias", 0.1), ("forestBias", 0.1)],
                    &[("forestRimChance", 0.15)],
                ),
            )]),
        ),
    ]);

    group(vec![
        (
            "sea",
            group(vec![
                ("maxLanes", count(3)),
                ("minLengthFrac", ratio(0.7)),
                ("scanStride", count(6).min(1.0)),
                ("avoidRadius", count(2)),
                ("preferDiagonals", flag(true)),
                ("laneSpacing", count(6)),
                ("minChannelWidth", count(3)),
            ]),
        ),
        ("islandHop", group(vec![("useHotspots", flag(true)), ("maxArcs", count(2))])),
        (
            "land",
            group(vec![
                ("useRiftShoulders", flag(true)),
                ("maxCorridors", count(5)),
                ("minRunLength", count(24)),
                ("spacing", count(11)),
            ]),
        ),
        (
            "river",
            group(vec![
                ("maxChains", count(2)),
                ("maxSteps", count(80)),
                ("preferLowlandBelow", num(300.0)),
                ("coastSeedRadius", count(2)),
                ("minTiles", count(24)),
                ("mustEndNearCoast", flag(true)),
            ]),
        ),
        (
            "policy",
            group(vec![
                (
                    "sea",
                    group(vec![
                        ("protection", choice("hard", &["hard", "soft"])),
                        ("softChanceMultiplier", ratio(0.5)),
                    ]),
                ),
                ("land", group(vec![("biomesBiasStrength", ratio(0.6))])),
                ("river", group(vec![("biomesBiasStrength", ratio(0.5))])),
            ]),
        ),
        ("kinds", kinds),
    ])
}

// ── Landmass, coastlines, margins, islands ────────────────────────────────────

fn landmass() -> Node {
    let band = group(vec![
        ("westFrac", ratio(0.0)),
        ("eastFrac", ratio(1.0)),
        ("westOceanOffset", num(0.0).range(-4.0, 4.0)),
        ("eastOceanOffset", num(0.0).range(-4.0, 4.0)),
    ]);
    let default_bands = vec![
        json!({ "westFrac": 0.0, "eastFrac": 0.3, "westOceanOffset": 1.0, "eastOceanOffset": -0.35 }),
        json!({ "westFrac": 0.35, "eastFrac": 0.6, "westOceanOffset": 0.25, "eastOceanOffset": -0.25 }),
        json!({ "westFrac": 0.75, "eastFrac": 1.0, "westOceanOffset": 0.5, "eastOceanOffset": -1.0 }),
    ];

    group(vec![
        ("baseWaterPercent", percent(64.0)),
        ("waterThumbOnScale", num(-4.0).range(-50.0, 50.0)),
        ("jitterAmpFracBase", ratio(0.03)),
        ("jitterAmpFracScale", ratio(0.015)),
        ("curveAmpFrac", ratio(0.05)),
        (
            "geometry",
            group(vec![
                ("oceanColumnsScale", weight(1.1)),
                ("oceanWaterColumns", count(4)),
                ("polarWaterRows", count(2)),
                ("bands", list(band, default_bands)),
            ]),
        ),
    ])
}

fn coastlines() -> Node {
    group(vec![
        (
            "bay",
            group(vec![
                ("noiseGateAdd", int(0).range(-10.0, 10.0)),
                ("rollDenActive", count(4).min(1.0)),
                ("rollDenDefault", count(5).min(1.0)),
            ]),
        ),
        (
            "fjord",
            group(vec![
                ("baseDenom", count(12).min(1.0)),
                ("activeBonus", count(1)),
                ("passiveBonus", count(2)),
            ]),
        ),
        ("minSeaLaneWidth", count(4)),
        (
            "plateBias",
            group(vec![
                ("threshold", ratio(0.45)),
                ("power", weight(1.25)),
                ("convergent", num(1.0).range(-2.0, 2.0)),
                ("transform", num(0.4).range(-2.0, 2.0)),
                ("divergent", num(-0.6).range(-2.0, 2.0)),
                ("interior", num(0.0).range(-2.0, 2.0)),
                ("bayWeight", weight(0.35)),
                ("bayNoiseBonus", weight(1.0)),
                ("fjordWeight", weight(0.8)),
            ]),
        ),
    ])
}

fn margins() -> Node {
    group(vec![
        ("activeFraction", ratio(0.25)),
        ("passiveFraction", ratio(0.25)),
        ("minSegmentLength", count(12)),
    ])
}

fn islands() -> Node {
    group(vec![
        ("fractalThresholdPercent", percent(90.0)),
        ("baseIslandDenNearActive", count(5).min(1.0)),
        ("baseIslandDenElse", count(7).min(1.0)),
        ("hotspotSeedDenom", count(2).min(1.0)),
        ("clusterMax", count(3)),
        ("minDistFromLandRadius", count(2)),
    ])
}

// ── Climate ───────────────────────────────────────────────────────────────────

fn climate_baseline() -> Node {
    group(vec![
        ("blend", group(vec![("baseWeight", weight(0.6)), ("bandWeight", weight(0.4))])),
        (
            "bands",
            group(vec![
                ("deg0to10", rain(120.0)),
                ("deg10to20", rain(104.0)),
                ("deg20to35", rain(75.0)),
                ("deg35to55", rain(70.0)),
                ("deg55to70", rain(60.0)),
                ("deg70plus", rain(45.0)),
            ]),
        ),
        (
            "orographic",
            group(vec![
                ("hi1Threshold", num(350.0)),
                ("hi1Bonus", rain(8.0)),
                ("hi2Threshold", num(600.0)),
                ("hi2Bonus", rain(7.0)),
            ]),
        ),
        (
            "coastal",
            group(vec![("coastalLandBonus", rain(24.0)), ("shallowAdjBonus", rain(16.0))]),
        ),
        (
            "noise",
            group(vec![("baseSpanSmall", count(3).max(50.0)), ("spanLargeScaleFactor", weight(1.0))]),
        ),
    ])
}

fn climate_refine() -> Node {
    group(vec![
        (
            "waterGradient",
            group(vec![
                ("radius", count(5).max(32.0)),
                ("perRingBonus", rain(5.0)),
                ("lowlandBonus", rain(3.0)),
            ]),
        ),
        (
            "orographic",
            group(vec![
                ("steps", count(4).max(32.0)),
                ("reductionBase", rain(8.0)),
                ("reductionPerStep", rain(6.0)),
            ]),
        ),
        (
            "riverCorridor",
            group(vec![
                ("lowlandAdjacencyBonus", rain(14.0)),
                ("highlandAdjacencyBonus", rain(5.0)),
            ]),
        ),
        ("lowBasin", group(vec![("radius", count(3).max(32.0)), ("delta", rain(6.0))])),
    ])
}

// ── Biomes, density, placement, dev ───────────────────────────────────────────

fn biomes() -> Node {
    group(vec![
        (
            "tundra",
            group(vec![
                ("latMin", abs_lat(70.0)),
                ("elevMin", num(850.0)),
                ("rainMax", rain(90.0)),
            ]),
        ),
        ("tropicalCoast", group(vec![("latMax", abs_lat(18.0)), ("rainMin", rain(105.0))])),
        (
            "riverValleyGrassland",
            group(vec![("latMax", abs_lat(50.0)), ("rainMin", rain(75.0))]),
        ),
        (
            "riftShoulder",
            group(vec![
                ("grasslandLatMax", abs_lat(50.0)),
                ("grasslandRainMin", rain(75.0)),
                ("tropicalLatMax", abs_lat(18.0)),
                ("tropicalRainMin", rain(100.0)),
            ]),
        ),
    ])
}

fn features_density() -> Node {
    group(vec![
        ("rainforestExtraChance", percent(75.0)),
        ("forestExtraChance", percent(20.0)),
        ("taigaExtraChance", percent(35.0)),
        ("shelfReefMultiplier", weight(0.6)),
    ])
}

fn placement() -> Node {
    group(vec![
        ("wondersPlusOne", flag(true)),
        (
            "floodplains",
            group(vec![("minLength", count(4).min(1.0)), ("maxLength", count(10).min(1.0))]),
        ),
    ])
}

fn dev() -> Node {
    group(vec![
        ("enabled", flag(false)),
        ("logTiming", flag(false)),
        ("logStoryTags", flag(false)),
        ("rainfallHistogram", flag(false)),
    ])
}

// ── World model ───────────────────────────────────────────────────────────────

fn world_model() -> Node {
    group(vec![
        (
            "plates",
            group(vec![
                ("count", count(8).max(64.0)),
                (
                    "axisAngles",
                    list(degrees(0.0), vec![json!(15.0), json!(-20.0), json!(35.0)]),
                ),
                ("convergenceMix", ratio(0.6)),
                ("seedJitter", count(3)),
                ("interiorSmooth", count(3).max(16.0)),
            ]),
        ),
        (
            "wind",
            group(vec![
                ("jetStreaks", count(5).max(32.0)),
                ("jetStrength", weight(1.3)),
                ("variance", ratio(0.6)),
                ("coriolisZonalScale", weight(1.0)),
            ]),
        ),
        (
            "currents",
            group(vec![
                ("basinGyreCountMax", count(2).max(8.0)),
                ("westernBoundaryBias", weight(1.1)),
                ("currentStrength", weight(3.0)),
            ]),
        ),
        (
            "pressure",
            group(vec![
                ("bumps", count(4).max(64.0)),
                ("amplitude", weight(0.6)),
                ("scale", ratio(0.4)),
            ]),
        ),
        ("directionality", directionality()),
        (
            "policy",
            group(vec![
                ("windInfluence", weight(1.0)),
                ("currentHumidityBias", ratio(0.4)),
                ("boundaryFjordBias", weight(0.3)),
                ("shelfReefBias", weight(0.2)),
                (
                    "oceanSeparation",
                    group(vec![
                        ("enabled", flag(false)),
                        (
                            "bandPairs",
                            list(tuple(vec![count(0), count(1)]), vec![json!([0, 1]), json!([1, 2])]),
                        ),
                        ("baseSeparationTiles", count(2)),
                        ("boundaryClosenessMultiplier", weight(1.0)),
                        ("maxPerRowDelta", count(3)),
                        ("respectSeaLanes", flag(true)),
                        ("minChannelWidth", count(4)),
                    ]),
                ),
            ]),
        ),
    ])
}

fn directionality() -> Node {
    group(vec![
        ("cohesion", ratio(0.65)),
        (
            "primaryAxes",
            group(vec![
                ("plateAxisDeg", degrees(20.0)),
                ("windBiasDeg", degrees(0.0)),
                ("currentBiasDeg", degrees(-10.0)),
            ]),
        ),
        (
            "interplay",
            group(vec![
                ("windsFollowPlates", ratio(0.4)),
                ("currentsFollowWinds", ratio(0.6)),
                ("riftsFollowPlates", ratio(0.8)),
                ("orogenyOpposesRifts", ratio(0.5)),
            ]),
        ),
        (
            "hemispheres",
            group(vec![
                ("southernFlip", flag(false)),
                ("equatorBandDeg", abs_lat(12.0)),
                ("monsoonBias", ratio(0.3)),
            ]),
        ),
        (
            "variability",
            group(vec![
                ("angleJitterDeg", num(8.0).range(0.0, 90.0)),
                ("magnitudeVariance", ratio(0.35)),
                ("seedOffset", int(0).range(0.0, u32::MAX as f64)),
            ]),
        ),
    ])
}
