use chrono::NaiveDate;
use kitchen_label::{compose_caption, format_date, initials, render_label, try_render_label, CaptionInputs, IdGenerator, LabelStyle};
use proptest::prelude::*;
use proptest::test_runner::Config;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn date() -> impl Strategy<Value = NaiveDate> {
    (1970i32..2100, 1u32..=12, 1u32..=28).prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

proptest! {
    #![proptest_config(Config::with_cases(128))]

    #[test]
    fn initials_have_one_char_per_token(tokens in prop::collection::vec("[^\\s]{1,8}", 0..6), sep in "[ \t\n]{1,3}") {
        let name = tokens.join(&sep);
        prop_assert_eq!(initials(&name).chars().count(), name.split_whitespace().count());
    }

    #[test]
    fn format_date_is_idempotent(d in date(), style in 0usize..5) {
        let raw = match style {
            0 => d.format("%Y-%m-%d").to_string(),
            1 => d.format("%m/%d/%Y").to_string(),
            2 => d.format("%B %-d, %Y").to_string(),
            3 => d.and_hms_opt(13, 45, 0).unwrap().format("%Y-%m-%dT%H:%M").to_string(),
            _ => d.format("%-d %b %Y").to_string(),
        };
        let once = format_date(&raw);
        prop_assert_eq!(&once, &d.format("%Y-%m-%d").to_string());
        prop_assert_eq!(format_date(&once), once);
    }

    #[test]
    fn format_date_is_idempotent_on_noise(text in "\\PC{0,20}") {
        let once = format_date(&text);
        prop_assert_eq!(format_date(&once), once);
    }

    #[test]
    fn caption_has_four_fields(product in "[A-Za-z ]{1,20}", name in "[A-Za-z]{1,8} [A-Za-z]{1,8}", a in date(), b in date()) {
        let caption = compose_caption(&product, &name, &a.to_string(), &b.to_string());
        prop_assert_eq!(caption, format!("{product} / {} / {a} / {b}", initials(&name)));
    }

    #[test]
    fn caption_never_clips(product in "[ -~]{0,80}", seed in any::<u64>()) {
        let style = LabelStyle::default();
        let id = IdGenerator::default().generate_with(1_735_689_600_000, &mut StdRng::seed_from_u64(seed));
        let inputs = CaptionInputs::new(product, "Jane Doe", "2025-01-01", "2025-01-04");
        let bare = try_render_label(id.as_str(), None, &style).unwrap();
        let image = try_render_label(id.as_str(), Some(&inputs), &style).unwrap();
        prop_assert!(image.width >= bare.width);
        prop_assert!(image.width >= style.estimate_caption_width(&inputs.caption()));
        prop_assert!(image.height >= style.bar_height + style.caption_size + 2 * style.margin);
        prop_assert_eq!(render_label(id.as_str(), Some(&inputs), &style), image.to_svg());
    }
}

#[test]
fn compose_caption_example() {
    assert_eq!(compose_caption("Soup", "Jane Doe", "2025-01-01", "2025-01-04"), "Soup / JD / 2025-01-01 / 2025-01-04");
}
