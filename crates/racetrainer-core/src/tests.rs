#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::commands::SimCommand;
    use crate::definition::ScenarioDefinition;
    use crate::enums::*;
    use crate::params::*;
    use crate::types::*;

    // ---- Direction ----

    #[test]
    fn test_compass_bearings() {
        let origin = Location::new(0.0, 0.0);
        assert_eq!(origin.bearing_to(&Location::new(0.0, 10.0)).degrees(), 0);
        assert_eq!(origin.bearing_to(&Location::new(10.0, 0.0)).degrees(), 90);
        assert_eq!(origin.bearing_to(&Location::new(0.0, -10.0)).degrees(), 180);
        assert_eq!(origin.bearing_to(&Location::new(-10.0, 0.0)).degrees(), -90);
        assert_eq!(origin.bearing_to(&Location::new(5.0, 5.0)).degrees(), 45);
    }

    #[test]
    fn test_direction_wraps_at_180() {
        assert_eq!(Direction::from_degrees(180.0).degrees(), 180);
        assert_eq!(Direction::from_degrees(-180.0).degrees(), 180);
        assert_eq!(Direction::from_degrees(190.0).degrees(), -170);
        assert_eq!(Direction::from_degrees(-190.0).degrees(), 170);
        assert_eq!(Direction::from_degrees(720.0).degrees(), 0);
        assert!(Direction::from_radians(-std::f64::consts::PI).radians() > 0.0);
    }

    #[test]
    fn test_direction_offset() {
        let d = Direction::from_degrees(170.0).offset(20.0);
        assert_eq!(d.degrees(), -170);
        assert_eq!(Direction::from_degrees(-45.0).opposite().degrees(), 135);
    }

    #[test]
    fn test_angle_diff_sign() {
        let north = Direction::from_degrees(0.0);
        let east = Direction::from_degrees(90.0);
        assert_eq!(north.angle_diff(&east), 90, "east is clockwise of north");
        assert_eq!(east.angle_diff(&north), -90);
        let a = Direction::from_degrees(170.0);
        let b = Direction::from_degrees(-170.0);
        assert_eq!(a.angle_diff(&b), 20, "shortest way crosses south");
        assert_eq!(a.abs_angle_diff(&b), 20);
    }

    #[test]
    fn test_direction_serde_normalizes() {
        let d: Direction = serde_json::from_str("7.0").unwrap();
        assert!(d.radians() <= std::f64::consts::PI);
        assert!(d.radians() > -std::f64::consts::PI);
    }

    proptest! {
        #[test]
        fn prop_direction_normalized(d in -100_000i32..100_000) {
            let deg = Direction::from_degrees(d as f64).degrees();
            prop_assert!(deg > -180 && deg <= 180, "{} normalized to {}", d, deg);
            prop_assert_eq!((deg - d).rem_euclid(360), 0);
        }

        #[test]
        fn prop_angle_diff_antisymmetric(a in -720i32..720, b in -720i32..720) {
            let da = Direction::from_degrees(a as f64);
            let db = Direction::from_degrees(b as f64);
            let forward = da.angle_diff(&db);
            let back = db.angle_diff(&da);
            prop_assert!(forward > -180 && forward <= 180);
            if forward.abs() != 180 {
                prop_assert_eq!(forward, -back);
            }
        }

        #[test]
        fn prop_polar_round_trip(
            ox in -1000.0f64..1000.0,
            oy in -1000.0f64..1000.0,
            r in 0.01f64..5000.0,
            deg in -179i32..=180,
        ) {
            let origin = Location::new(ox, oy);
            let p = Polar::from_degrees(r, deg as f64);
            let back = Polar::between(origin, p.to_location(origin));
            prop_assert!((back.distance() - r).abs() < 1e-6);
            prop_assert_eq!(back.direction().degrees(), deg);
        }
    }

    // ---- Polar ----

    #[test]
    fn test_negative_polar_flips() {
        let p = Polar::from_degrees(-5.0, 30.0);
        assert_eq!(p.distance(), 5.0);
        assert_eq!(p.direction().degrees(), -150);
    }

    #[test]
    fn test_polar_add_subtract() {
        let north = Polar::from_degrees(10.0, 0.0);
        let east = Polar::from_degrees(10.0, 90.0);
        let sum = north + east;
        assert!((sum.distance() - 200f64.sqrt()).abs() < 1e-9);
        assert_eq!(sum.direction().degrees(), 45);
        let diff = north - east;
        assert_eq!(diff.direction().degrees(), -45);
        let back = sum - east;
        assert!((back.distance() - 10.0).abs() < 1e-9);
        assert_eq!(back.direction().degrees(), 0);
    }

    #[test]
    fn test_polar_perpendicular_offsets() {
        let p = Polar::from_degrees(10.0, 0.0);
        let right = p.add_perpendicular(10.0);
        assert_eq!(right.direction().degrees(), 45, "offset goes to the right");
        let left = p.sub_perpendicular(10.0);
        assert_eq!(left.direction().degrees(), -45);
    }

    #[test]
    fn test_polar_to_location() {
        let loc = Polar::from_degrees(10.0, 90.0).to_location(Location::new(1.0, 2.0));
        assert!((loc.x - 11.0).abs() < 1e-9);
        assert!((loc.y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_polar_distance_along() {
        let p = Polar::from_degrees(10.0, 60.0);
        let along = p.distance_along(&Direction::from_degrees(0.0));
        assert!((along - 5.0).abs() < 1e-9);
        let across = p.distance_along(&Direction::from_degrees(180.0));
        assert!((across - 5.0).abs() < 1e-9, "projection ignores axis sense");
    }

    // ---- Flow ----

    #[test]
    fn test_knots_conversion() {
        let flow = Flow::from_degrees(0.0, 10.0);
        assert!((flow.metres_per_second() - 18530.0 / 3600.0).abs() < 1e-12);
        assert_eq!(knots_to_metres_per_second(0.0), 0.0);
    }

    #[test]
    fn test_bounds_corners() {
        let b = Bounds::default();
        assert_eq!(b.north_east(), Location::new(500.0, 500.0));
        assert_eq!(b.south_west(), Location::new(-500.0, -500.0));
        assert!(b.contains(&Location::new(0.0, 0.0)));
        assert!(!b.contains(&Location::new(501.0, 0.0)));
        assert!(Bounds::UNLIMITED.contains(&Location::new(1e12, -1e12)));
    }

    #[test]
    fn test_sim_time_clock() {
        let mut t = SimTime::default();
        for _ in 0..65 {
            t.advance();
        }
        assert_eq!(t.clock(), "01:05");
    }

    // ---- Parameter parsing ----

    #[test]
    fn test_parse_yes_no() {
        assert_eq!(parse_yes_no("yes"), Ok(true));
        assert_eq!(parse_yes_no("no"), Ok(false));
        assert!(parse_yes_no("true").is_err());
    }

    #[test]
    fn test_parse_location() {
        assert_eq!(parse_location("10,-20.5"), Ok(Location::new(10.0, -20.5)));
        assert!(parse_location("10").is_err());
        assert!(parse_location("1,2,3").is_err());
        assert!(parse_location("a,b").is_err());
    }

    #[test]
    fn test_parse_colour() {
        assert_eq!(parse_colour("red"), Ok(Colour::RED));
        assert_eq!(parse_colour("darkgrey"), Ok(Colour::DARK_GREY));
        assert_eq!(
            parse_colour("10, 20, 30"),
            Ok(Colour { r: 10, g: 20, b: 30, a: 255 })
        );
        assert_eq!(
            parse_colour("10,20,30,40"),
            Ok(Colour { r: 10, g: 20, b: 30, a: 40 })
        );
        assert!(parse_colour("256,0,0").is_err(), "components are 0-255");
        assert!(parse_colour("1,2").is_err());
        assert!(parse_colour("1,2,3,4,5").is_err());
        assert!(parse_colour("purple").is_err());
    }

    // ---- Schemas ----

    #[derive(Default)]
    struct Widget {
        size: i32,
        visible: bool,
        label: String,
    }

    fn widget_schema() -> &'static ParamSchema<Widget> {
        static SCHEMA: std::sync::OnceLock<ParamSchema<Widget>> = std::sync::OnceLock::new();
        SCHEMA.get_or_init(|| {
            ParamSchema::new(vec![
                ParamField::integer("size", |w: &mut Widget, v| w.size = v),
                ParamField::yes_no("visible", |w: &mut Widget, v| w.visible = v),
                ParamField::text("label", |w: &mut Widget, v: &str| w.label = v.to_string()),
            ])
        })
    }

    impl Parameterised for Widget {
        fn schema(&self) -> &'static ParamSchema<Self> {
            widget_schema()
        }
    }

    #[test]
    fn test_set_parameter_statuses() {
        let mut w = Widget::default();
        assert_eq!(w.set_parameter("size", "12"), ParamStatus::Ok);
        assert_eq!(w.size, 12);
        assert_eq!(w.set_parameter("colour", "red"), ParamStatus::BadKey);
        assert_eq!(w.set_parameter("visible", "maybe"), ParamStatus::BadValue);
        assert!(!w.visible);
        assert_eq!(w.set_parameter("label", " mark one "), ParamStatus::Ok);
        assert_eq!(w.label, "mark one");
    }

    #[test]
    fn test_check_does_not_mutate() {
        let w = Widget::default();
        let mut errors = ParamErrors::new();
        w.check_parameters("w", &key_values(&[("size", "7"), ("visible", "yes")]), &mut errors);
        assert!(errors.is_empty());
        assert_eq!(w.size, 0);
        assert!(!w.visible);
    }

    #[test]
    fn test_error_messages_accumulate() {
        let mut w = Widget::default();
        let mut errors = ParamErrors::new();
        w.set_parameters(
            "w1",
            &key_values(&[("speed", "3"), ("size", "big"), ("size", "4")]),
            &mut errors,
        );
        assert_eq!(
            errors.messages(),
            &[
                "Attempting to set undefined key (w1.speed=3)".to_string(),
                "Attempting to set key with bad value (w1.size=big)".to_string(),
            ]
        );
        assert_eq!(w.size, 4, "later valid keys still apply");
        errors.missing_instance("ghost");
        assert_eq!(errors.messages()[2], "instance does not exist (ghost)");
        let err = errors.into_result().unwrap_err();
        assert_eq!(err.0.len(), 3);
    }

    #[test]
    #[should_panic(expected = "duplicate parameter key")]
    fn test_duplicate_schema_key_panics() {
        let _ = ParamSchema::<Widget>::new(vec![
            ParamField::integer("size", |w: &mut Widget, v| w.size = v),
            ParamField::integer("size", |w: &mut Widget, v| w.size = v * 2),
        ]);
    }

    // ---- Serde ----

    #[test]
    fn test_enum_serde() {
        for v in [
            SailingMode::SailOn,
            SailingMode::Stopped,
            SailingMode::MarkRounding,
            SailingMode::Turn,
        ] {
            let json = serde_json::to_string(&v).unwrap();
            let back: SailingMode = serde_json::from_str(&json).unwrap();
            assert_eq!(v, back);
        }
        for v in [Side::Port, Side::Starboard] {
            assert_eq!(Side::from_sign(v.sign()), v);
            assert_eq!(v.opposite().opposite(), v);
        }
    }

    #[test]
    fn test_command_serde_tagged() {
        let json = serde_json::to_string(&SimCommand::Key { key: "s".into() }).unwrap();
        assert!(json.contains("\"type\":\"Key\""));
        let back: SimCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SimCommand::Key { key: "s".into() });
    }

    #[test]
    fn test_definition_builder() {
        let def = ScenarioDefinition::new("test")
            .with_settings(&[("firstmark", "top")])
            .with_element("top", "mark", &[("location", "0,100")])
            .with_scheduled(30, "wind", &[("from", "10")])
            .with_key("s", "wind", &[("from", "-10")]);
        assert_eq!(def.element("top").map(|e| e.class.as_str()), Some("mark"));
        assert_eq!(def.scheduled[0].secs, 30);
        assert_eq!(def.key_bindings[0].target.instance, "wind");
    }
}
