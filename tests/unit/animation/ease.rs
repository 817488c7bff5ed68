use super::*;

const ALL: [&str; 9] = [
    "none",
    "sine.in",
    "sine",
    "sine.inOut",
    "power2",
    "power4.in",
    "expo",
    "expo.inOut",
    "circ.in",
];

#[test]
fn every_curve_hits_both_endpoints() {
    for ident in ALL {
        let ease: Ease = ident.parse().unwrap();
        assert!(ease.apply(0.0).abs() < 1e-12, "{ident} at 0");
        assert!((ease.apply(1.0) - 1.0).abs() < 1e-12, "{ident} at 1");
    }
}

#[test]
fn in_out_is_symmetric_around_midpoint() {
    let ease = Ease::SINE_IN_OUT;
    assert!((ease.apply(0.5) - 0.5).abs() < 1e-12);
    let a = ease.apply(0.2);
    let b = ease.apply(0.8);
    assert!((a + b - 1.0).abs() < 1e-12);
}

#[test]
fn bare_family_means_out() {
    assert_eq!("sine".parse::<Ease>().unwrap(), Ease::SINE_OUT);
    assert_eq!(
        "power2".parse::<Ease>().unwrap(),
        Ease::Curve(Curve::Power(2), EaseDir::Out)
    );
    assert_eq!("power0".parse::<Ease>().unwrap(), Ease::Linear);
}

#[test]
fn in_curves_start_slow() {
    let ease = Ease::Curve(Curve::Power(2), EaseDir::In);
    assert!(ease.apply(0.25) < 0.25);
    let ease = Ease::Curve(Curve::Power(2), EaseDir::Out);
    assert!(ease.apply(0.25) > 0.25);
}

#[test]
fn unknown_identifiers_are_rejected() {
    assert!("bounce".parse::<Ease>().is_err());
    assert!("sine.sideways".parse::<Ease>().is_err());
    assert!("".parse::<Ease>().is_err());
}

#[test]
fn serde_uses_dotted_identifiers() {
    let ease: Ease = serde_json::from_str("\"expo.inOut\"").unwrap();
    assert_eq!(ease, Ease::Curve(Curve::Expo, EaseDir::InOut));
    assert_eq!(serde_json::to_string(&ease).unwrap(), "\"expo.inOut\"");
    assert_eq!(serde_json::to_string(&Ease::Linear).unwrap(), "\"none\"");
}
