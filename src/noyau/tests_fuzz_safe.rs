//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler le pipeline sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - profondeur bornée
//! - budget temps global
//! - arbre aléatoire -> texte (parenthèses minimales) -> parse -> evaluate,
//!   comparé à une évaluation récursive directe de l’arbre
//! - texte poubelle : erreurs typées acceptées, jamais de panique

use std::time::{Duration, Instant};

use super::expression::parse;
use super::nombre::Nombre;

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
    fn coin(&mut self) -> bool {
        (self.next_u32() & 1) == 1
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Arbre de référence ------------------------ */

const VARIABLES: [(&str, f64); 3] = [("x", 1.5), ("y", -2.0), ("z", 0.25)];
const LITTERAUX: [&str; 8] = ["0", "1", "2", "3", "7", "0.5", "2.25", "10"];

#[derive(Clone, Debug)]
enum Arbre {
    Nb(&'static str),
    Var(usize),
    Neg(Box<Arbre>),
    Bin(char, Box<Arbre>, Box<Arbre>),
    Appel(&'static str, Vec<Arbre>),
}

impl Arbre {
    /// 1: + -   2: * / %   3: ^   4: unaire   5: atome / appel
    fn niveau(&self) -> u8 {
        match self {
            Arbre::Nb(_) | Arbre::Var(_) | Arbre::Appel(..) => 5,
            Arbre::Neg(_) => 4,
            Arbre::Bin('+' | '-', ..) => 1,
            Arbre::Bin('^', ..) => 3,
            Arbre::Bin(..) => 2,
        }
    }

    fn texte(&self) -> String {
        match self {
            Arbre::Nb(s) => s.to_string(),
            Arbre::Var(i) => VARIABLES[*i].0.to_string(),
            Arbre::Neg(a) => format!("-{}", a.texte_min(4)),
            Arbre::Bin(op, g, d) => {
                let n = self.niveau();
                // gauche-associatif : la droite doit être strictement plus forte ; '^' l’inverse
                let (ng, nd) = if *op == '^' { (n + 1, n) } else { (n, n + 1) };
                format!("{} {op} {}", g.texte_min(ng), d.texte_min(nd))
            }
            Arbre::Appel(nom, args) => {
                let a: Vec<String> = args.iter().map(Arbre::texte).collect();
                format!("{nom}({})", a.join(", "))
            }
        }
    }

    /// Texte parenthésé si le niveau du nœud est inférieur à `min`.
    fn texte_min(&self, min: u8) -> String {
        if self.niveau() < min {
            format!("({})", self.texte())
        } else {
            self.texte()
        }
    }

    /// Mêmes opérations f64, dans le même ordre, que les règles intégrées.
    fn valeur(&self) -> f64 {
        match self {
            Arbre::Nb(s) => s.parse().unwrap_or(f64::NAN),
            Arbre::Var(i) => VARIABLES[*i].1,
            Arbre::Neg(a) => -a.valeur(),
            Arbre::Bin(op, g, d) => {
                let (a, b) = (g.valeur(), d.valeur());
                match op {
                    '+' => a + b,
                    '-' => a - b,
                    '*' => a * b,
                    '/' => a / b,
                    '%' => a % b,
                    _ => a.powf(b),
                }
            }
            Arbre::Appel(nom, args) => {
                let v: Vec<f64> = args.iter().map(Arbre::valeur).collect();
                match *nom {
                    "sin" => v[0].sin(),
                    "abs" => v[0].abs(),
                    "max" => v.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                    "min" => v.iter().copied().fold(f64::INFINITY, f64::min),
                    _ => v[0].atan2(v[1]),
                }
            }
        }
    }
}

/// Paramètres de génération.
struct Gen {
    ops: &'static [char],
    litteraux: &'static [&'static str],
    fonctions: bool,
}

const GEN_COMPLET: Gen = Gen {
    ops: &['+', '-', '*', '/', '%', '^'],
    litteraux: &LITTERAUX,
    fonctions: true,
};

const GEN_ENTIERS: Gen = Gen {
    ops: &['+', '-', '*'],
    litteraux: &["0", "1", "2", "3", "7"],
    fonctions: false,
};

fn gen_arbre(rng: &mut Rng, profondeur: u32, g: &Gen) -> Arbre {
    if profondeur == 0 || rng.pick(4) == 0 {
        return if g.fonctions && rng.coin() {
            Arbre::Var(rng.pick(VARIABLES.len() as u32) as usize)
        } else {
            Arbre::Nb(g.litteraux[rng.pick(g.litteraux.len() as u32) as usize])
        };
    }

    let p = profondeur - 1;
    match rng.pick(if g.fonctions { 6 } else { 4 }) {
        0 => Arbre::Neg(Box::new(gen_arbre(rng, p, g))),
        1..=3 => {
            let op = g.ops[rng.pick(g.ops.len() as u32) as usize];
            Arbre::Bin(
                op,
                Box::new(gen_arbre(rng, p, g)),
                Box::new(gen_arbre(rng, p, g)),
            )
        }
        4 => {
            let nom = ["sin", "abs"][rng.pick(2) as usize];
            Arbre::Appel(nom, vec![gen_arbre(rng, p, g)])
        }
        _ => {
            let (nom, n) = match rng.pick(3) {
                0 => ("max", 1 + rng.pick(3) as usize),
                1 => ("min", 1 + rng.pick(3) as usize),
                _ => ("atan2", 2),
            };
            let args = (0..n).map(|_| gen_arbre(rng, p, g)).collect();
            Arbre::Appel(nom, args)
        }
    }
}

fn meme_f64(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

/* ------------------------ Campagnes ------------------------ */

#[test]
fn fuzz_arbres_contre_reference() {
    let start = Instant::now();
    let max = Duration::from_secs(5);
    let mut rng = Rng::new(0xC0FFEE);

    for _ in 0..3000 {
        budget(start, max);

        let arbre = gen_arbre(&mut rng, 5, &GEN_COMPLET);
        let texte = arbre.texte();

        let mut e = parse(&texte).unwrap_or_else(|err| panic!("texte={texte:?} err={err}"));
        e.set_variables(VARIABLES).unwrap();

        assert!(e.validate(true).est_valide(), "texte={texte:?}");

        let obtenu = e.evaluate().unwrap_or_else(|err| panic!("texte={texte:?} err={err}"));
        let attendu = arbre.valeur();
        assert!(
            meme_f64(obtenu, attendu),
            "texte={texte:?} obtenu={obtenu} attendu={attendu}"
        );

        // idempotence
        assert!(meme_f64(e.evaluate().unwrap_or(f64::NAN), obtenu));
    }
}

#[test]
fn fuzz_exact_sur_entiers() {
    // + - * sur entiers <= 7, profondeur 4 : |valeur| <= 7^16 < 2^53, donc f64 est exact aussi
    let start = Instant::now();
    let max = Duration::from_secs(5);
    let mut rng = Rng::new(42);

    for _ in 0..2000 {
        budget(start, max);

        let arbre = gen_arbre(&mut rng, 4, &GEN_ENTIERS);
        let texte = arbre.texte();

        let e = parse(&texte).unwrap_or_else(|err| panic!("texte={texte:?} err={err}"));
        let exact = e.evaluate_exact().unwrap_or_else(|err| panic!("texte={texte:?} err={err}"));
        let rapide = e.evaluate().unwrap_or_else(|err| panic!("texte={texte:?} err={err}"));

        assert!(exact.est_exact(), "texte={texte:?}");
        assert_eq!(exact.to_f64(), rapide, "texte={texte:?}");
        assert_eq!(exact, Nombre::Reel(arbre.valeur()), "texte={texte:?}");
    }
}

#[test]
fn fuzz_texte_poubelle_sans_panique() {
    let start = Instant::now();
    let max = Duration::from_secs(5);
    let mut rng = Rng::new(7);

    let morceaux = [
        "1", "2.5", ".", "e", "x", "y", "sin", "max", "pow", "(", ")", ",", "+", "-", "*", "/",
        "^", "%", " ", "9e9", "1e", "π", "#", "!", "()",
    ];

    let mut analyses = 0usize;
    for _ in 0..5000 {
        budget(start, max);

        let n = 1 + rng.pick(12) as usize;
        let texte: String = (0..n)
            .map(|_| morceaux[rng.pick(morceaux.len() as u32) as usize])
            .collect();

        // erreur typée ou expression : les deux sont acceptables
        let Ok(mut e) = parse(&texte) else {
            continue;
        };
        analyses += 1;

        let _ = e.set_variables([("x", 2.0), ("y", 3.0)]);
        let v = e.validate(true);
        let r = e.evaluate();
        let ex = e.evaluate_exact();

        // une expression valide s’évalue toujours
        if v.est_valide() {
            assert!(r.is_ok(), "texte={texte:?} err={r:?}");
            assert!(ex.is_ok(), "texte={texte:?} err={ex:?}");
        }
    }

    assert!(analyses > 0, "aucune expression analysée : générateur trop hostile");
}

#[test]
fn fuzz_determinisme() {
    // même seed => même suite de textes et mêmes résultats
    let campagne = |seed: u64| -> Vec<(String, u64)> {
        let mut rng = Rng::new(seed);
        (0..200)
            .map(|_| {
                let arbre = gen_arbre(&mut rng, 4, &GEN_COMPLET);
                let texte = arbre.texte();
                let v = parse(&texte)
                    .ok()
                    .and_then(|e| e.evaluate().ok())
                    .unwrap_or(f64::NAN);
                (texte, v.to_bits())
            })
            .collect()
    };

    assert_eq!(campagne(1234), campagne(1234));
}
