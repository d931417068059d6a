use crscale::numeric::ability_modifier;
use crscale::*;

const REFERENCE: &str = include_str!("../data/reference.json");
const TEMPLATES: &str = include_str!("../data/templates.json");

fn load() -> (ReferenceData, TemplateRegistry) {
    (
        ReferenceData::from_json(REFERENCE).unwrap(),
        TemplateRegistry::from_json(TEMPLATES).unwrap(),
    )
}

/// The bundled reference data covers every CR from 0 to 30.
#[test]
fn test_reference_covers_all_crs() {
    let (reference, _) = load();
    let mut expected = vec![
        ChallengeRating::Zero,
        ChallengeRating::Eighth,
        ChallengeRating::Quarter,
        ChallengeRating::Half,
    ];
    expected.extend((1..=30).map(ChallengeRating::Whole));

    let crs: Vec<ChallengeRating> = reference.averages.keys().copied().collect();
    assert_eq!(crs, expected);
    assert_eq!(reference.sizes.len(), 7);
}

/// Every bundled template resolves at every CR, and its narrative renders.
#[test]
fn test_every_template_resolves_at_every_cr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let (reference, templates) = load();
    let resolver = StatblockResolver::new(&reference);

    for (id, _) in templates.iter() {
        for &cr in reference.averages.keys() {
            let derived = resolver
                .resolve_by_id(&templates, id, cr)
                .unwrap_or_else(|err| panic!("{id} at CR {cr}: {err}"));

            assert!(derived.size.map_or(true, |size| size <= 6));
            assert!(derived.hit_dice >= 1);
            assert!(derived.natural_armor.map_or(true, |armor| armor >= 0));
            for ability in Ability::ALL {
                assert_eq!(
                    derived.ability_modifiers.get(ability),
                    ability_modifier(derived.abilities.get(ability))
                );
            }
            for (attack_id, attack) in &derived.attacks {
                assert!(attack.profile.damage_dice.map_or(false, |count| count >= 1));
                derived
                    .render_proc(attack_id, &reference)
                    .unwrap_or_else(|err| panic!("{id} {attack_id} at CR {cr}: {err}"));
            }
            derived
                .render_traits(&reference)
                .unwrap_or_else(|err| panic!("{id} traits at CR {cr}: {err}"));
        }
    }
}

/// At a sampled CR the bundled wolf reproduces its sample.
#[test]
fn test_wolf_at_sampled_cr() {
    let (reference, templates) = load();
    let wolf = StatblockResolver::new(&reference)
        .resolve_by_id(&templates, "wolf", ChallengeRating::Quarter)
        .unwrap();

    assert_eq!(wolf.name.as_deref(), Some("Wolf"));
    assert_eq!(wolf.abilities.get(Ability::Dex), 15);
    assert_eq!(wolf.natural_armor, Some(1));
    assert_eq!(wolf.armor_class.value, 13);
    assert_eq!(wolf.hit_points.map(|hp| hp.average), Some(11));
    assert_eq!(wolf.passive_perception, 13);

    let bite = &wolf.attacks["bite"];
    assert_eq!(bite.attack_bonus, 3);
    assert_eq!(bite.average_damage, Some(6));
    assert_eq!(
        wolf.render_proc("bite", &reference).unwrap().as_deref(),
        Some("If the target is a creature, it must succeed on a DC 11 Strength saving throw or be knocked prone.")
    );

    let traits = wolf.render_traits(&reference).unwrap();
    assert_eq!(traits.len(), 3);
    assert_eq!(traits[2].name, "Pounce");
    assert!(traits[2].text.ends_with("takes an extra 2d4 damage."));
}

/// Locked speed holds at every CR; the goblin's scimitar has no proc.
#[test]
fn test_goblin_locked_speed() {
    let (reference, templates) = load();
    let resolver = StatblockResolver::new(&reference);

    for cr in [ChallengeRating::Zero, ChallengeRating::Whole(10)] {
        let goblin = resolver.resolve_by_id(&templates, "goblin", cr).unwrap();
        assert_eq!(goblin.speed, Some(30));
        assert_eq!(goblin.render_proc("scimitar", &reference).unwrap(), None);
    }
}
