//! # Seed Data Generator
//!
//! Populates the database with an admin account and a small catalog for
//! local development.
//!
//! ## Usage
//! ```bash
//! # Seed ./pharmashelf_dev.db
//! cargo run -p pharma-db --bin seed
//!
//! # Specify database path and admin credentials
//! cargo run -p pharma-db --bin seed -- --db ./data/pharmashelf.db \
//!     --email admin@pharmashelf.local --password change-me-now
//! ```
//!
//! ## Generated Data
//! - One active admin (role `admin`)
//! - One active pharmacist
//! - Categories with a handful of drugs each, some in stock, some low,
//!   some out of stock, so every dashboard panel has something to show
//! - A few interactions and alternatives

use std::env;

use pharma_core::forms::{NewAlternative, NewCategory, NewDrug, NewInteraction};
use pharma_core::Role;
use pharma_db::password::hash_password;
use pharma_db::{Database, DbConfig};

/// (category, description, [(drug, active ingredient, dosage form, stock)])
const CATALOG: &[(&str, &str, &[(&str, &str, &str, i64)])] = &[
    (
        "Analgesics",
        "Pain relief and fever reduction",
        &[
            ("Paracetamol 500mg", "Paracetamol", "Tablet", 120),
            ("Ibuprofen 400mg", "Ibuprofen", "Tablet", 4),
            ("Aspirin 100mg", "Acetylsalicylic acid", "Tablet", 35),
            ("Diclofenac Gel", "Diclofenac sodium", "Gel", 0),
        ],
    ),
    (
        "Antibiotics",
        "Bacterial infections",
        &[
            ("Amoxicillin 500mg", "Amoxicillin", "Capsule", 60),
            ("Azithromycin 250mg", "Azithromycin", "Tablet", 2),
            ("Ciprofloxacin 500mg", "Ciprofloxacin", "Tablet", 18),
        ],
    ),
    (
        "Anticoagulants",
        "Prevention of blood clots",
        &[("Warfarin 5mg", "Warfarin sodium", "Tablet", 25)],
    ),
    (
        "Antihistamines",
        "Allergy relief",
        &[
            ("Cetirizine 10mg", "Cetirizine", "Tablet", 80),
            ("Loratadine 10mg", "Loratadine", "Tablet", 5),
        ],
    ),
    (
        "Gastrointestinal",
        "Acid reflux and digestion",
        &[
            ("Omeprazole 20mg", "Omeprazole", "Capsule", 44),
            ("Oral Rehydration Salts", "Sodium chloride, glucose", "Powder", 0),
        ],
    ),
    ("Vitamins", "Dietary supplements", &[("Vitamin D3 1000IU", "Cholecalciferol", "Softgel", 3)]),
];

/// (drug a, drug b, severity, description)
const INTERACTIONS: &[(&str, &str, &str, &str)] = &[
    (
        "Warfarin 5mg",
        "Aspirin 100mg",
        "Severe",
        "Increased risk of bleeding",
    ),
    (
        "Warfarin 5mg",
        "Ibuprofen 400mg",
        "Severe",
        "Increased risk of gastrointestinal bleeding",
    ),
    (
        "Ciprofloxacin 500mg",
        "Oral Rehydration Salts",
        "Mild",
        "Separate doses by two hours",
    ),
];

/// (drug, alternative, note)
const ALTERNATIVES: &[(&str, &str, &str)] = &[
    ("Ibuprofen 400mg", "Paracetamol 500mg", "Preferred with anticoagulants"),
    ("Loratadine 10mg", "Cetirizine 10mg", "Same indication, may cause drowsiness"),
    ("Diclofenac Gel", "Ibuprofen 400mg", "Oral option"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./pharmashelf_dev.db");
    let mut email = String::from("admin@pharmashelf.local");
    let mut password = String::from("pharmashelf-admin");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" if i + 1 < args.len() => {
                db_path = args[i + 1].clone();
                i += 1;
            }
            "--email" | "-e" if i + 1 < args.len() => {
                email = args[i + 1].clone();
                i += 1;
            }
            "--password" | "-p" if i + 1 < args.len() => {
                password = args[i + 1].clone();
                i += 1;
            }
            "--help" | "-h" => {
                println!("PharmaShelf Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>          Database file path (default: ./pharmashelf_dev.db)");
                println!("  -e, --email <EMAIL>      Admin email (default: admin@pharmashelf.local)");
                println!("  -p, --password <PASS>    Admin password (default: pharmashelf-admin)");
                println!("  -h, --help               Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 PharmaShelf Seed Data Generator");
    println!("==================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.categories().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} categories", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Accounts
    let admin = db
        .users()
        .create("Administrator", &email, &hash_password(&password)?)
        .await?;
    db.users().update_from_admin(admin.id, Role::Admin, true).await?;

    let pharmacist = db
        .users()
        .create(
            "Pat Pharmacist",
            "pharmacist@pharmashelf.local",
            &hash_password("pharmashelf-staff")?,
        )
        .await?;
    db.users()
        .update_from_admin(pharmacist.id, Role::Pharmacist, true)
        .await?;

    println!("✓ Created admin {} and one pharmacist", email);

    // Catalog
    let mut created = Vec::new();
    for (category_name, description, drugs) in CATALOG {
        let category = db
            .categories()
            .create(&NewCategory {
                name: category_name.to_string(),
                description: description.to_string(),
            })
            .await?;

        for (name, ingredient, form, stock) in drugs.iter() {
            let drug = db
                .drugs()
                .create(
                    &NewDrug {
                        name: name.to_string(),
                        active_ingredient: ingredient.to_string(),
                        dosage_form: form.to_string(),
                        indications: format!("{} for {}", ingredient, description.to_lowercase()),
                        side_effects: String::new(),
                        stock_quantity: *stock,
                        category_id: category.id,
                    },
                    admin.id,
                )
                .await?;
            created.push(drug);
        }
    }
    println!("✓ Created {} categories and {} drugs", CATALOG.len(), created.len());

    let id_of = |name: &str| created.iter().find(|d| d.name == name).map(|d| d.id);

    for (a, b, severity, description) in INTERACTIONS {
        let (Some(drug_a_id), Some(drug_b_id)) = (id_of(a), id_of(b)) else {
            eprintln!("Skipping interaction {} / {}: unknown drug", a, b);
            continue;
        };
        db.interactions()
            .create(&NewInteraction {
                drug_a_id,
                drug_b_id,
                severity: severity.to_string(),
                description: description.to_string(),
            })
            .await?;
    }

    for (drug, alternative, note) in ALTERNATIVES {
        let (Some(drug_id), Some(alternative_drug_id)) = (id_of(drug), id_of(alternative)) else {
            eprintln!("Skipping alternative {} → {}: unknown drug", drug, alternative);
            continue;
        };
        db.alternatives()
            .create(&NewAlternative {
                drug_id,
                alternative_drug_id,
                note: note.to_string(),
            })
            .await?;
    }
    println!(
        "✓ Created {} interactions and {} alternatives",
        INTERACTIONS.len(),
        ALTERNATIVES.len()
    );

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
