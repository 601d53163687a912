// src/noyau/format.rs

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Signed;

use super::jetons::Jeton;
use super::nombre::Nombre;

/// Format utilitaire (debug/“démarche”) : liste de jetons en texte.
pub fn format_jetons(jetons: &[Jeton]) -> String {
    jetons
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/* ------------------------ Décimal (scaled -> texte) ------------------------ */

fn pow10(n: usize) -> BigInt {
    BigInt::from(10).pow(n as u32)
}

/// Convertit un entier “scalé” (×10^digits) en texte décimal tronqué.
fn scaled_to_decimal(mut scaled: BigInt, digits: usize) -> String {
    let neg = scaled.is_negative();
    if neg {
        scaled = -scaled;
    }

    let scale = pow10(digits);
    let int_part = &scaled / &scale;
    let frac_part = &scaled % &scale;

    let signe = if neg { "-" } else { "" };
    if digits == 0 {
        return format!("{signe}{int_part}");
    }

    let mut frac = frac_part.to_str_radix(10);
    while frac.len() < digits {
        frac.insert(0, '0');
    }

    format!("{signe}{int_part}.{frac}")
}

/// r -> entier “scalé” = trunc(r * 10^digits)
fn rational_scaled(r: &BigRational, digits: usize) -> BigInt {
    let scale = pow10(digits);
    (r.numer() * scale) / r.denom()
}

/// Lecture décimale tronquée d’un nombre :
/// - Rationnel : `digits` chiffres exacts après la virgule (troncature)
/// - Reel      : affichage flottant standard
pub fn format_decimal(n: &Nombre, digits: usize) -> String {
    match n {
        Nombre::Rationnel(r) => {
            let s = scaled_to_decimal(rational_scaled(r, digits), digits);
            // -1/1000 sur 2 chiffres => "-0.00" : le signe vient du rationnel
            if r.is_negative() && !s.starts_with('-') {
                format!("-{s}")
            } else {
                s
            }
        }
        Nombre::Reel(x) => format!("{x}"),
    }
}
