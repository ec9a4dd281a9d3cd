//! Development data seeder for Cafedesk.
//!
//! Creates a demo café (subdomain `demo`) with five tables, three customers
//! and a small menu, then prints an admin and a frontdesk token for it.
//! Running it again only prints fresh tokens.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

use cafedesk_db::repositories::{
    BalanceLedgerRepository, CafeError, CafeRepository, CreateCafeInput, CreateCustomerInput,
    CreateMenuItemInput, CreateTableInput, CustomerRepository, MenuRepository, TableRepository,
};
use cafedesk_shared::types::{CafeId, CustomerId, StaffId};
use cafedesk_shared::{AppConfig, JwtService, StaffRole};

const DEMO_SUBDOMAIN: &str = "demo";

/// Name, phone, opening credit in paisa.
const CUSTOMERS: [(&str, &str, i64); 3] = [
    ("Ram Sharma", "9841234567", 0),
    ("Sita Thapa", "9851234567", 15_050),
    ("Hari Gurung", "9861234567", 0),
];

/// Name, category, price, description.
const MENU: [(&str, &str, i64, &str); 8] = [
    ("Chiyaa (Tea)", "Beverages", 20, "Traditional Nepali tea"),
    ("Coffee", "Beverages", 50, "Hot coffee"),
    ("Cold Drink", "Beverages", 40, "Soft drinks"),
    ("Ice", "Beverages", 10, "Ice cubes"),
    ("Samosa", "Snacks", 15, "Crispy vegetable samosa"),
    ("Momo", "Main Course", 120, "Steamed dumplings"),
    ("Chowmein", "Main Course", 80, "Stir-fried noodles"),
    ("Burger", "Fast Food", 150, "Chicken/Veg burger"),
];

/// Name, x, y on the floor plan.
const TABLES: [(&str, i32, i32); 5] = [
    ("Table 1", 50, 50),
    ("Table 2", 200, 50),
    ("Table 3", 350, 50),
    ("Table 4", 50, 200),
    ("Table 5", 200, 200),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    println!("Connecting to database...");
    let db = cafedesk_db::connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    let cafe_id = match CafeRepository::new(db.clone())
        .find_by_subdomain(DEMO_SUBDOMAIN)
        .await
    {
        Ok(cafe) => {
            println!("  Demo cafe already exists, skipping data...");
            CafeId::from_uuid(cafe.id)
        }
        Err(CafeError::NotFound(_)) => seed_demo_cafe(&db).await?,
        Err(e) => return Err(e.into()),
    };

    let jwt = JwtService::from_config(&config.jwt);
    let admin = jwt.generate_access_token(StaffId::new(), cafe_id, StaffRole::Admin)?;
    let frontdesk = jwt.generate_access_token(StaffId::new(), cafe_id, StaffRole::Frontdesk)?;

    println!("Seeding complete!");
    println!("  Cafe id:         {cafe_id}");
    println!("  Admin token:     {admin}");
    println!("  Frontdesk token: {frontdesk}");
    Ok(())
}

async fn seed_demo_cafe(db: &DatabaseConnection) -> anyhow::Result<CafeId> {
    println!("Seeding demo cafe...");
    let cafe = CafeRepository::new(db.clone())
        .create(CreateCafeInput {
            name: "Demo Cafe".to_string(),
            subdomain: DEMO_SUBDOMAIN.to_string(),
        })
        .await?;
    let cafe_id = CafeId::from_uuid(cafe.id);

    println!("Seeding tables...");
    let tables = TableRepository::new(db.clone());
    for (name, x, y) in TABLES {
        tables
            .create(
                cafe_id,
                CreateTableInput {
                    name: name.to_string(),
                    position_x: x,
                    position_y: y,
                    width: 100,
                    height: 100,
                },
            )
            .await?;
    }

    println!("Seeding customers...");
    let customers = CustomerRepository::new(db.clone());
    let ledger = BalanceLedgerRepository::new(db.clone());
    for (name, phone, opening) in CUSTOMERS {
        let customer = customers
            .create(
                cafe_id,
                CreateCustomerInput {
                    name: name.to_string(),
                    phone: phone.to_string(),
                },
            )
            .await?;
        if opening > 0 {
            ledger
                .apply_delta(
                    cafe_id,
                    CustomerId::from_uuid(customer.id),
                    Decimal::new(opening, 2),
                )
                .await?;
        }
    }

    println!("Seeding menu...");
    let menu = MenuRepository::new(db.clone());
    for (name, category, price, description) in MENU {
        menu.create(
            cafe_id,
            CreateMenuItemInput {
                name: name.to_string(),
                category: category.to_string(),
                price: Decimal::from(price),
                description: description.to_string(),
                available: true,
            },
        )
        .await?;
    }

    Ok(cafe_id)
}
