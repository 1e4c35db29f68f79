//! Demo catalog seeding.
//!
//! Fills an empty catalog with a few categories and products so a fresh
//! install has something to browse. Refuses to touch a non-empty catalog.

use rust_decimal::Decimal;

use super::{CliError, connect};

struct SeedProduct {
    category_slug: &'static str,
    name: &'static str,
    slug: &'static str,
    description: &'static str,
    price_cents: i64,
}

const SEED_CATEGORIES: &[(&str, &str, &str)] = &[
    (
        "Kitchen",
        "kitchen",
        "Boards, knives, and everything else for the counter.",
    ),
    ("Bath", "bath", "Soaps and towels that outlast the trend cycle."),
    (
        "Workspace",
        "workspace",
        "Desk goods built for long days.",
    ),
];

const SEED_PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        category_slug: "kitchen",
        name: "Walnut cutting board",
        slug: "walnut-cutting-board",
        description: "End-grain walnut, 40x30cm, oiled and ready.",
        price_cents: 6800,
    },
    SeedProduct {
        category_slug: "kitchen",
        name: "Carbon steel pan",
        slug: "carbon-steel-pan",
        description: "26cm, pre-seasoned, lighter than cast iron.",
        price_cents: 5400,
    },
    SeedProduct {
        category_slug: "bath",
        name: "Linen waffle towel",
        slug: "linen-waffle-towel",
        description: "Stonewashed linen, dries fast, softens with use.",
        price_cents: 3200,
    },
    SeedProduct {
        category_slug: "workspace",
        name: "Brass desk lamp",
        slug: "brass-desk-lamp",
        description: "Solid brass arm, warm 2700K bulb included.",
        price_cents: 12_900,
    },
    SeedProduct {
        category_slug: "workspace",
        name: "A5 dot grid notebook",
        slug: "a5-dot-grid-notebook",
        description: "120gsm paper, lay-flat binding, 192 pages.",
        price_cents: 1400,
    },
];

/// Seed the catalog.
///
/// # Errors
///
/// Returns an error if the catalog is not empty or a query fails.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM store.categories")
        .fetch_one(&pool)
        .await?;
    if existing > 0 {
        return Err(CliError::InvalidArgument(
            "catalog is not empty; refusing to seed".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    for (name, slug, description) in SEED_CATEGORIES {
        sqlx::query(
            r"
            INSERT INTO store.categories (name, slug, description)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(name)
        .bind(slug)
        .bind(description)
        .execute(&mut *tx)
        .await?;
    }

    for product in SEED_PRODUCTS {
        sqlx::query(
            r"
            INSERT INTO store.products (category_id, name, slug, description, price)
            SELECT id, $2, $3, $4, $5
            FROM store.categories
            WHERE slug = $1
            ",
        )
        .bind(product.category_slug)
        .bind(product.name)
        .bind(product.slug)
        .bind(product.description)
        .bind(Decimal::new(product.price_cents, 2))
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        categories = SEED_CATEGORIES.len(),
        products = SEED_PRODUCTS.len(),
        "catalog seeded"
    );
    Ok(())
}
