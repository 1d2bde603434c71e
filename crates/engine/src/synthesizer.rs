//! C1 - Descriptor Synthesizer.
//!
//! A pure function over `(player, genre, storyText, currentLocation,
//! activeQuest, gameState, preGeneratedKey)`. Fails only when `storyText`
//! is empty; every other input combination produces a descriptor.
//!
//! Classification is keyword-driven and order-sensitive (first match
//! wins, §4.1). `heroPose`, `camera`, and `timeOfDay`-when-unspecified are
//! the only randomized fields (P6).

use chrono::Utc;
use scenesmith_domain::{
    Biome, Camera, DomainError, FocalSubject, HeroPose, Lighting, Mood, Prompts, RenderContext,
    SceneDescriptor, SceneId, SceneStatus, TimeOfDay, Weather,
};

use crate::random::RandomPort;

const SUMMARY_MAX_LEN: usize = 320;
const NEGATIVE_PROMPT_BASE: &str =
    "lowres, bad anatomy, text artifacts, watermarks, distorted hands, extra limbs";
const NEGATIVE_PROMPT_EXTRA: &str =
    "oversaturated skin, text overlays, extra limbs, malformed hands";
const STYLE_CODA: &str = "bright, vibrant, high-exposure daylight, painterly detail, \
cinematic volumetric light rays, trending on artstation";

/// Synthesize a [`SceneDescriptor`] from a render request. Pure except for
/// the injected randomness, which only affects `heroPose`, `camera`, and
/// an unresolved `timeOfDay`.
pub fn synthesize(
    ctx: &RenderContext,
    rng: &dyn RandomPort,
) -> Result<SceneDescriptor, DomainError> {
    if ctx.story_text.is_empty() {
        return Err(DomainError::invalid_input("storyText must not be empty"));
    }

    let story_lower = ctx.story_text.to_lowercase();
    let location_lower = ctx
        .current_location
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();

    let mood = classify_mood(&story_lower);
    let weather = classify_weather(&story_lower);
    let time_of_day = classify_time_of_day(&story_lower, rng);
    let palette = classify_palette(mood, &ctx.genre);
    let biome = classify_biome(&location_lower, &ctx.genre);
    let lighting = classify_lighting(mood);
    let hero_pose = HeroPose::ALL[rng.choose_index(HeroPose::ALL.len())];
    let camera = Camera::ALL[rng.choose_index(Camera::ALL.len())];

    let location_name = ctx
        .current_location
        .clone()
        .unwrap_or_else(|| biome.as_str().to_string());

    let summary = summarize(&ctx.story_text);

    let focal_subjects = build_focal_subjects(ctx);
    let supporting_details = build_supporting_details(ctx);

    let title = ctx
        .active_quest
        .as_ref()
        .map(|q| q.title.clone())
        .unwrap_or_else(|| format!("{} Scene", ctx.genre));
    let subtitle = format!("{location_name} \u{2014} {mood}");

    let base = build_base_prompt(
        biome,
        time_of_day,
        weather,
        lighting,
        &focal_subjects,
        hero_pose,
        camera,
        &summary,
        ctx.active_quest.as_ref(),
        &palette,
    );
    let negative = format!("{NEGATIVE_PROMPT_BASE}, {NEGATIVE_PROMPT_EXTRA}");

    Ok(SceneDescriptor {
        scene_id: SceneId::new(),
        title,
        subtitle,
        genre: ctx.genre.clone(),
        location_name,
        biome,
        mood,
        weather,
        lighting,
        time_of_day,
        hero_pose,
        camera,
        palette,
        summary,
        focal_subjects,
        supporting_details,
        prompts: Prompts { base, negative },
        status: SceneStatus::Pending,
        assets: None,
        created_at: Utc::now(),
        pre_generated_key: ctx.pre_generated_key.clone(),
    })
}

fn classify_mood(story_lower: &str) -> Mood {
    Mood::ALL
        .into_iter()
        .find(|m| m.keywords().iter().any(|kw| story_lower.contains(kw)))
        .unwrap_or(Mood::Serene)
}

fn classify_weather(story_lower: &str) -> Weather {
    Weather::ALL
        .into_iter()
        .find(|w| w.keywords().iter().any(|kw| story_lower.contains(kw)))
        .unwrap_or(Weather::Sunny)
}

fn classify_time_of_day(story_lower: &str, rng: &dyn RandomPort) -> TimeOfDay {
    TimeOfDay::CLASSIFICATION_ORDER
        .into_iter()
        .find(|t| t.keywords().iter().any(|kw| story_lower.contains(kw)))
        .unwrap_or_else(|| {
            let options = TimeOfDay::UNSPECIFIED_FALLBACK;
            options[rng.choose_index(options.len())]
        })
}

fn classify_palette(mood: Mood, genre: &str) -> [String; 5] {
    // Mood always defines a fixed palette, so the genre/serene fallbacks
    // below are unreachable today; kept because the spec phrases palette
    // selection as "mood, else genre, else serene" and a future mood
    // without a fixed palette should fall through correctly.
    let _ = genre;
    mood.palette().map(str::to_string)
}

fn classify_biome(location_lower: &str, genre: &str) -> Biome {
    const FOREST: &[&str] = &["forest", "grove", "woods"];
    const DESERT: &[&str] = &["desert", "dune", "waste"];
    const SETTLEMENT: &[&str] = &["city", "village", "town"];
    const RUINS: &[&str] = &["temple", "ruin"];

    if FOREST.iter().any(|kw| location_lower.contains(kw)) {
        Biome::EnchantedForest
    } else if DESERT.iter().any(|kw| location_lower.contains(kw)) {
        Biome::SunScorchedDesert
    } else if SETTLEMENT.iter().any(|kw| location_lower.contains(kw)) {
        Biome::AncientSettlement
    } else if RUINS.iter().any(|kw| location_lower.contains(kw)) {
        Biome::SacredRuins
    } else {
        Biome::genre_default(genre).unwrap_or(Biome::MysticCrossroads)
    }
}

fn classify_lighting(mood: Mood) -> Lighting {
    match mood {
        Mood::Intense | Mood::Ominous => Lighting::DramaticRimLight,
        _ => Lighting::SoftBounceLight,
    }
}

/// Whitespace-normalize and truncate to at most 320 characters, appending
/// an ellipsis when truncated.
fn summarize(story_text: &str) -> String {
    let normalized = story_text.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.chars().count() <= SUMMARY_MAX_LEN {
        return normalized;
    }
    let truncated: String = normalized.chars().take(SUMMARY_MAX_LEN).collect();
    format!("{truncated}...")
}

fn build_focal_subjects(ctx: &RenderContext) -> Vec<FocalSubject> {
    let mut subjects = vec![FocalSubject {
        name: ctx.player.name.clone(),
        role: "hero".to_string(),
        description: format!("a level {} {}", ctx.player.level, ctx.player.class),
    }];

    if let Some(quest) = &ctx.active_quest {
        if !quest.title.is_empty() {
            subjects.push(FocalSubject {
                name: quest.title.clone(),
                role: "quest focus".to_string(),
                description: quest.description.clone(),
            });
        }
    }

    subjects
}

fn build_supporting_details(ctx: &RenderContext) -> Vec<String> {
    let mut details = Vec::new();
    if let Some(location) = &ctx.current_location {
        details.push(format!("set in {location}"));
    }
    if let Some(quest) = &ctx.active_quest {
        if !quest.description.is_empty() {
            details.push(quest.description.clone());
        }
    }
    details
}

#[allow(clippy::too_many_arguments)]
fn build_base_prompt(
    biome: Biome,
    time_of_day: TimeOfDay,
    weather: Weather,
    lighting: Lighting,
    focal_subjects: &[FocalSubject],
    hero_pose: HeroPose,
    camera: Camera,
    summary: &str,
    active_quest: Option<&scenesmith_domain::Quest>,
    palette: &[String; 5],
) -> String {
    let subjects = focal_subjects
        .iter()
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let quest_line = active_quest
        .map(|q| format!(" Quest: {}.", q.title))
        .unwrap_or_default();
    let palette_line = palette.join(", ");

    format!(
        "A {biome} at {time_of_day}, {weather} weather, {lighting}. \
Featuring {subjects}, posed in {hero_pose}, shot as a {camera}. \
Story excerpt: \"{summary}\".{quest_line} Palette: {palette_line}. {STYLE_CODA}"
    )
}
