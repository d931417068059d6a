//! Statblock Scaling Example
//!
//! Scales the bundled templates across a range of challenge ratings and
//! prints each derived statblock the way a display layer might:
//! - Abilities, armor class and hit points
//! - Attacks with their chosen damage dice
//! - Rendered traits and attack procs
//! - Where each stat came from
//!
//! Usage: `cargo run --example scale -- [template] [cr...]`
//! Set `RUST_LOG=crscale=debug` to watch the extrapolation steps.

use crscale::*;

const REFERENCE: &str = include_str!("../data/reference.json");
const TEMPLATES: &str = include_str!("../data/templates.json");

fn signed(value: i32) -> String {
    if value >= 0 {
        format!("+{value}")
    } else {
        value.to_string()
    }
}

fn print_statblock(derived: &DerivedStatblock, reference: &ReferenceData) -> Result<(), ScaleError> {
    let size = match derived.size {
        Some(size) => reference.size(size)?.name.clone(),
        None => "Unsized".to_string(),
    };
    println!(
        "{} (CR {})",
        derived.name.as_deref().unwrap_or(&derived.slug),
        derived.challenge_rating
    );
    println!("  {} {}, {}", size, derived.creature_type, derived.alignment);

    let armor = if derived.armor_class.natural {
        " (natural armor)"
    } else {
        ""
    };
    println!("  Armor Class {}{}", derived.armor_class.value, armor);
    if let Some(hp) = derived.hit_points {
        println!(
            "  Hit Points {} ({}d{}{})",
            hp.average,
            hp.hit_dice,
            hp.hit_die,
            signed(hp.constitution_bonus)
        );
    }
    if let Some(speed) = derived.speed {
        println!("  Speed {speed} ft.");
    }

    let abilities: Vec<String> = Ability::ALL
        .into_iter()
        .map(|ability| {
            format!(
                "{} {} ({})",
                ability.as_str().to_uppercase(),
                derived.abilities.get(ability),
                signed(derived.ability_modifiers.get(ability))
            )
        })
        .collect();
    println!("  {}", abilities.join("  "));

    if !derived.skills.is_empty() {
        let skills: Vec<String> = derived
            .skills
            .iter()
            .map(|skill| format!("{} {}", skill.skill, signed(skill.modifier)))
            .collect();
        println!("  Skills {}", skills.join(", "));
    }
    println!("  Senses passive Perception {}", derived.passive_perception);
    println!("  Proficiency {}  XP {}", signed(derived.proficiency), derived.xp);

    for rendered in derived.render_traits(reference)? {
        println!("  {}. {}", rendered.name, rendered.text);
    }

    for (id, attack) in &derived.attacks {
        let name = attack.profile.name.as_deref().unwrap_or(id);
        let damage = match (attack.profile.damage_dice, attack.profile.damage_die_size) {
            (Some(count), Some(die)) => format!(
                "{} ({count}d{die}{})",
                attack.average_damage.unwrap_or_default(),
                signed(attack.ability_modifier)
            ),
            _ => "no damage".to_string(),
        };
        let kind = if attack.profile.is_ranged() {
            "Ranged"
        } else {
            "Melee"
        };
        print!(
            "  {name} ({kind}): {} to hit, {damage}",
            signed(attack.attack_bonus)
        );
        if let Some(proc_text) = derived.render_proc(id, reference)? {
            print!(" {proc_text}");
        }
        println!();
    }

    println!("  Breakdown:");
    for (path, provenance) in &derived.breakdown {
        println!("    {path}: {provenance:?}");
    }
    println!();
    Ok(())
}

fn main() -> Result<(), ScaleError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let reference = ReferenceData::from_json(REFERENCE)?;
    let templates = TemplateRegistry::from_json(TEMPLATES)?;
    let resolver = StatblockResolver::new(&reference);

    let mut args = std::env::args().skip(1);
    let ids: Vec<String> = match args.next() {
        Some(id) => vec![id],
        None => templates.iter().map(|(id, _)| id.to_string()).collect(),
    };
    let mut crs = args
        .map(|label| label.parse())
        .collect::<Result<Vec<ChallengeRating>, _>>()?;
    if crs.is_empty() {
        crs = vec![
            ChallengeRating::Quarter,
            ChallengeRating::Whole(3),
            ChallengeRating::Whole(12),
        ];
    }

    println!("=== Challenge Rating Scaling Example ===\n");
    for id in &ids {
        for &cr in &crs {
            let derived = resolver.resolve_by_id(&templates, id, cr)?;
            print_statblock(&derived, &reference)?;
        }
    }
    Ok(())
}
