//! Tests scientifiques (campagne) : cas concrets + propriétés du pipeline.
//!
//! But : vérifier la chaîne complète texte -> jetons -> RPN -> évaluation
//! sur les cas de référence, puis quelques propriétés (idempotence, copies,
//! accord rapide/exact) sans faire chauffer la machine.
//!
//! Notes :
//! - L’unaire est plus prioritaire que tout binaire : "-2^2" vaut 4.
//! - Le mode exact n’est exact que tant que les règles le permettent ; sin, log… repassent en f64.

use std::time::{Duration, Instant};

use assert_matches::assert_matches;

use super::erreurs::{ErreurAnalyse, ErreurEvaluation, ErreurLexicale, ErreurSyntaxe};
use super::format::{format_decimal, format_jetons};
use super::jetons::{Jeton, Options};
use super::nombre::{Litteral, Nombre};
use super::registre::{
    Arite, Associativite, Fonction, NbArguments, Operateur, Registre, PRECEDENCE_UNAIRE,
};
use super::{parse, parse_avec, Expression};

fn eval_ok(expr: &str) -> f64 {
    parse(expr)
        .unwrap_or_else(|e| panic!("expr={expr:?} err={e}"))
        .evaluate()
        .unwrap_or_else(|e| panic!("expr={expr:?} err={e}"))
}

fn exact_ok(expr: &str) -> Nombre {
    parse(expr)
        .unwrap_or_else(|e| panic!("expr={expr:?} err={e}"))
        .evaluate_exact()
        .unwrap_or_else(|e| panic!("expr={expr:?} err={e}"))
}

fn assert_proche(expr: &str, attendu: f64) {
    let v = eval_ok(expr);
    assert!(
        (v - attendu).abs() <= 1e-12 * attendu.abs().max(1.0),
        "expr={expr:?} obtenu={v} attendu={attendu}"
    );
}

fn rpn(expr: &str) -> String {
    format_jetons(parse(expr).unwrap_or_else(|e| panic!("{e}")).jetons())
}

/// Budget global anti-gel.
fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Cas de référence ------------------------ */

#[test]
fn sci_cas_concrets() {
    assert_eq!(eval_ok("2 + 3 * 4"), 14.0);
    assert_eq!(eval_ok("(2 + 3) * 4"), 20.0);
    assert_eq!(eval_ok("2 ^ 3 ^ 2"), 512.0);
    assert_eq!(eval_ok("-3 + 4"), 1.0);
    assert_eq!(eval_ok("sin(0)"), 0.0);
    assert_eq!(eval_ok("max(3, 5, 1)"), 5.0);
}

#[test]
fn sci_postfixe_attendu() {
    assert_eq!(rpn("2 + 3 * 4"), "2 3 4 * +");
    assert_eq!(rpn("(2 + 3) * 4"), "2 3 + 4 *");
    assert_eq!(rpn("2 ^ 3 ^ 2"), "2 3 2 ^ ^");
    assert_eq!(rpn("-3 + 4"), "3 -u 4 +");
    assert_eq!(rpn("max(3, 5, 1)"), "3 5 1 max/3");
    assert_eq!(rpn("a - b - c"), "a b - c -");
}

#[test]
fn sci_unaires() {
    assert_eq!(eval_ok("-2^2"), 4.0);
    assert_eq!(eval_ok("2^-1"), 0.5);
    assert_eq!(eval_ok("- -3"), 3.0);
    assert_eq!(eval_ok("+3 - +1"), 2.0);
    assert_eq!(eval_ok("3 * -2"), -6.0);
    assert_eq!(eval_ok("max(-1, -2)"), -1.0);
    assert_eq!(eval_ok("(-(1))"), -1.0);
}

#[test]
fn sci_fonctions_integrees() {
    assert_proche("cos(0) + exp(0)", 2.0);
    assert_proche("sqrt(16) + cbrt(27)", 7.0);
    assert_proche("log(e)", 1.0);
    assert_proche("log10(1000) + log2(8)", 6.0);
    assert_proche("atan2(1, 1) * 4", std::f64::consts::PI);
    assert_proche("pow(2, 10)", 1024.0);
    assert_proche("todegree(pi)", 180.0);
    assert_proche("toradian(180)", std::f64::consts::PI);
    assert_eq!(eval_ok("abs(-2.5) + floor(1.7) + ceil(1.2)"), 5.5);
    assert_eq!(eval_ok("signum(-4) + signum(0)"), -1.0);
    assert_eq!(eval_ok("min(4, 2, 8)"), 2.0);
    assert_eq!(eval_ok("7 % 4"), 3.0);
}

#[test]
fn sci_constantes_et_multiplication_implicite() {
    assert_proche("2pi", 2.0 * std::f64::consts::PI);
    assert_proche("π - pi", 0.0);
    assert_proche("φ", 1.61803398874);
    assert_eq!(eval_ok("2(3 + 1)"), 8.0);
    assert_eq!(eval_ok("(1 + 1)(2 + 1)"), 6.0);
    assert_proche("2sin(pi / 2)", 2.0);
}

#[test]
fn sci_division_par_zero_ieee() {
    assert_eq!(eval_ok("1 / 0"), f64::INFINITY);
    assert_eq!(eval_ok("-1 / 0"), f64::NEG_INFINITY);
    assert!(eval_ok("0 / 0").is_nan());

    // le mode exact retombe en flottant
    let n = exact_ok("1 / 0");
    assert!(!n.est_exact());
    assert_eq!(n.to_f64(), f64::INFINITY);
}

/* ------------------------ Mode exact ------------------------ */

#[test]
fn sci_exact_rationnels() {
    assert_eq!(exact_ok("0.1 + 0.2").to_string(), "3/10");
    assert_eq!(exact_ok("1/3 + 1/6").to_string(), "1/2");
    assert_eq!(exact_ok("(2/3) ^ 3").to_string(), "8/27");
    assert_eq!(exact_ok("2 ^ -2").to_string(), "1/4");
    assert_eq!(exact_ok("max(1/3, 0.3)").to_string(), "1/3");
    assert_eq!(exact_ok("2.5e-3").to_string(), "1/400");
    assert_eq!(exact_ok("floor(-7/2)").to_string(), "-4");

    // 0.1 + 0.2 en f64 n’est pas 0.3, en exact si
    assert_ne!(eval_ok("0.1 + 0.2"), 0.3);
    assert_eq!(exact_ok("0.1 + 0.2"), exact_ok("0.3"));
}

#[test]
fn sci_exact_repli_flottant() {
    let n = exact_ok("sin(1) + 1/2");
    assert!(!n.est_exact());
    assert!((n.to_f64() - (1f64.sin() + 0.5)).abs() < 1e-15);

    let n = exact_ok("2 ^ 0.5");
    assert!(!n.est_exact());
}

#[test]
fn sci_lecture_decimale() {
    let n = exact_ok("1/3");
    assert_eq!(format_decimal(&n, 10), "0.3333333333");
    let n = exact_ok("-2/3");
    assert_eq!(format_decimal(&n, 4), "-0.6666");
    let n = exact_ok("-1/300");
    assert_eq!(format_decimal(&n, 2), "-0.00");
}

/* ------------------------ Propriétés ------------------------ */

#[test]
fn sci_idempotence_et_programme_inchange() {
    let mut e = parse("x^2 - 3x + 1").unwrap();
    e.set_variable("x", 1.5).unwrap();
    let avant = format_jetons(e.jetons());

    let a = e.evaluate().unwrap();
    let b = e.evaluate().unwrap();
    let c = e.evaluate_exact().unwrap();

    assert_eq!(a, b);
    assert_eq!(c.to_f64(), a);
    assert_eq!(format_jetons(e.jetons()), avant);
}

#[test]
fn sci_deux_compilations_identiques() {
    let texte = "max(a, b) / (1 + c^2)";
    let mut e1 = parse(texte).unwrap();
    let mut e2 = parse(texte).unwrap();
    assert_eq!(e1.jetons(), e2.jetons());

    for (a, b, c) in [(1.0, 2.0, 3.0), (-4.0, 0.5, 0.0), (10.0, 10.0, -1.0)] {
        e1.set_variables([("a", a), ("b", b), ("c", c)]).unwrap();
        e2.set_variables([("a", a), ("b", b), ("c", c)]).unwrap();
        assert_eq!(e1.evaluate(), e2.evaluate());
    }
}

#[test]
fn sci_copies_paralleles() {
    let mut base = parse("a * 1000 + b").unwrap();
    base.set_variable("b", 7.0).unwrap();

    let poignees: Vec<_> = (0..8)
        .map(|i| {
            let mut copie = base.clone();
            copie.set_variable("a", i as f64).unwrap();
            std::thread::spawn(move || copie.evaluate())
        })
        .collect();

    for (i, p) in poignees.into_iter().enumerate() {
        let v = p.join().unwrap().unwrap();
        assert_eq!(v, i as f64 * 1000.0 + 7.0);
    }
}

#[test]
fn sci_conflit_de_nom_preserve_les_liaisons() {
    let mut e = parse("x").unwrap();
    e.set_variable("x", 3.0).unwrap();
    assert!(e.set_variable("sin", 1.0).is_err());
    assert!(e.set_variable("max", 1.0).is_err());
    assert_eq!(e.evaluate(), Ok(3.0));
}

#[test]
fn sci_programme_a_operandes_en_trop() {
    let programme = vec![
        Jeton::Nombre(Litteral::from(2.0)),
        Jeton::Nombre(Litteral::from(3.0)),
    ];
    let e = Expression::depuis_postfixe(programme, Registre::global());
    let err = e.evaluate().unwrap_err();
    assert_eq!(err, ErreurEvaluation::OperandesEnTrop);
    assert_eq!(err.to_string(), "malformed program: extra operands remain");
    assert!(!e.validate(false).est_valide());
}

#[test]
fn sci_validation_puis_evaluation() {
    let e = parse("x + 1").unwrap();
    let v = e.validate(true);
    assert!(!v.est_valide());
    assert!(v.erreurs().iter().all(|m| !m.contains("operator") && !m.contains("operand")));
    assert_eq!(e.evaluate(), Err(ErreurEvaluation::VariableNonLiee("x".into())));
    assert_eq!(e.evaluate().unwrap_err().to_string(), "unbound variable x");

    assert!(parse("max(1, 2, 3)").unwrap().validate(true).est_valide());
    assert!(parse("-x").unwrap().validate(false).est_valide());
}

/* ------------------------ Erreurs d’analyse ------------------------ */

#[test]
fn sci_erreurs_lexicales() {
    assert_matches!(
        parse("1 + 2.3.4"),
        Err(ErreurAnalyse::Lexicale(ErreurLexicale::NombreMalForme { position: 4, .. }))
    );
    assert_matches!(
        parse("2e+"),
        Err(ErreurAnalyse::Lexicale(ErreurLexicale::NombreMalForme { .. }))
    );
    assert_matches!(
        parse("3 # 4"),
        Err(ErreurAnalyse::Lexicale(ErreurLexicale::CaractereInattendu { caractere: '#', position: 2 }))
    );
    assert_matches!(
        parse("sin + 1"),
        Err(ErreurAnalyse::Lexicale(ErreurLexicale::FonctionSansParenthese { .. }))
    );

    let opts = Options::default().avec_variables(["x"]);
    assert_matches!(
        parse_avec("x + y", Registre::global(), &opts),
        Err(ErreurAnalyse::Lexicale(ErreurLexicale::IdentifiantInconnu { position: 4, .. }))
    );
}

#[test]
fn sci_erreurs_syntaxe() {
    assert_matches!(parse("(1 + 2"), Err(ErreurAnalyse::Syntaxe(ErreurSyntaxe::ParentheseNonAppariee)));
    assert_matches!(parse("1 + 2)"), Err(ErreurAnalyse::Syntaxe(ErreurSyntaxe::ParentheseNonAppariee)));
    assert_matches!(parse("1, 2"), Err(ErreurAnalyse::Syntaxe(ErreurSyntaxe::SeparateurMalPlace)));
    assert_matches!(
        parse("pow(1)"),
        Err(ErreurAnalyse::Syntaxe(ErreurSyntaxe::NombreArgumentsInvalide { recus: 1, .. }))
    );
    assert_matches!(
        parse("max()"),
        Err(ErreurAnalyse::Syntaxe(ErreurSyntaxe::NombreArgumentsInvalide { recus: 0, .. }))
    );
    assert_eq!(
        parse("1, 2").unwrap_err().to_string(),
        "misplaced separator or unmatched parenthesis"
    );
}

/* ------------------------ Registre personnalisé ------------------------ */

#[test]
fn sci_registre_personnalise() {
    let factorielle = Operateur::new(
        "!",
        Arite::Unaire,
        PRECEDENCE_UNAIRE + 1,
        Associativite::Gauche,
        |a: &[f64]| (1..=a[0] as u64).map(|k| k as f64).product(),
    )
    .unwrap();
    let moyenne = Fonction::new("moyenne", NbArguments::Variable { min: 1 }, |a: &[f64]| {
        a.iter().sum::<f64>() / a.len() as f64
    })
    .unwrap();

    let registre = Registre::standard()
        .avec_operateur(factorielle)
        .avec_fonction(moyenne);
    let opts = Options::default();

    let e = parse_avec("3! + moyenne(1, 2, 3, 4)", &registre, &opts).unwrap();
    assert_eq!(e.evaluate(), Ok(8.5));

    let mut e = parse_avec("moyenne(x, 4)", &registre, &opts).unwrap();
    assert!(e.set_variable("moyenne", 1.0).is_err());
    e.set_variable("x", 2.0).unwrap();
    assert_eq!(e.evaluate(), Ok(3.0));

    // le registre global n’est pas touché
    assert!(Registre::global().fonction("moyenne").is_none());
}

/* ------------------------ Stress borné ------------------------ */

#[test]
fn sci_stress_profondeur_et_longueur() {
    let start = Instant::now();
    let max = Duration::from_secs(3);

    // profondeur de parenthèses : le shunting-yard est itératif
    let n = 2000;
    let texte = format!("{}1{}", "(".repeat(n), ")".repeat(n));
    assert_eq!(eval_ok(&texte), 1.0);
    budget(start, max);

    // longue somme
    let texte = vec!["1"; 5000].join(" + ");
    assert_eq!(eval_ok(&texte), 5000.0);
    budget(start, max);

    // longue chaîne de ^ (associativité droite) : 1^1^...^1
    let texte = vec!["1"; 2000].join("^");
    assert_eq!(eval_ok(&texte), 1.0);
    budget(start, max);
}
