use storefront_api::{
    config::AppConfig,
    db::{DbPool, create_orm_conn, create_pool, run_migrations},
    services::{auth_service::hash_password, role_service},
};
use uuid::Uuid;

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    price: i64,
    original_price: Option<i64>,
    image: &'static str,
    category: &'static str,
    is_highlight: bool,
    extras: &'static [(&'static str, i64)],
}

const CATALOG: &[SeedProduct] = &[
    SeedProduct {
        name: "Frango Assado Tradicional",
        description: "Frango inteiro temperado com nossos temperos especiais, assado lentamente até ficar dourado e suculento.",
        price: 3590,
        original_price: Some(4290),
        image: "https://images.unsplash.com/photo-1598103442097-8b74394b95c6?w=400&h=300&fit=crop",
        category: "frangos",
        is_highlight: true,
        extras: &[("Farofa Especial", 800), ("Maionese da Casa", 500), ("Vinagrete", 400)],
    },
    SeedProduct {
        name: "Frango Caipira",
        description: "Frango caipira criado livre, com sabor mais intenso e textura especial.",
        price: 4590,
        original_price: None,
        image: "https://images.unsplash.com/photo-1594221708779-94832f4320d1?w=400&h=300&fit=crop",
        category: "frangos",
        is_highlight: false,
        extras: &[("Farofa Especial", 800), ("Maionese da Casa", 500)],
    },
    SeedProduct {
        name: "Meio Frango Assado",
        description: "Metade do nosso delicioso frango assado, perfeito para uma pessoa.",
        price: 2290,
        original_price: None,
        image: "https://images.unsplash.com/photo-1604503468506-a8da13d82791?w=400&h=300&fit=crop",
        category: "frangos",
        is_highlight: false,
        extras: &[("Farofa Especial", 600), ("Maionese da Casa", 400)],
    },
    SeedProduct {
        name: "Batata Portuguesa",
        description: "Batatas assadas com alecrim e temperos especiais, douradas no forno.",
        price: 1590,
        original_price: None,
        image: "https://images.unsplash.com/photo-1518977676601-b53f82aba655?w=400&h=300&fit=crop",
        category: "acompanhamentos",
        is_highlight: false,
        extras: &[],
    },
    SeedProduct {
        name: "Arroz Temperado",
        description: "Arroz branco temperado com cenoura, ervilha e temperos da casa.",
        price: 1290,
        original_price: None,
        image: "https://images.unsplash.com/photo-1586201375761-83865001e31c?w=400&h=300&fit=crop",
        category: "acompanhamentos",
        is_highlight: false,
        extras: &[],
    },
    SeedProduct {
        name: "Salada Mista",
        description: "Mix de folhas verdes, tomate, pepino e cenoura com molho especial.",
        price: 1090,
        original_price: None,
        image: "https://images.unsplash.com/photo-1512621776951-a57141f2eefd?w=400&h=300&fit=crop",
        category: "acompanhamentos",
        is_highlight: false,
        extras: &[],
    },
    SeedProduct {
        name: "Pão de Alho",
        description: "Pão francês tostado com manteiga de alho e ervas finas.",
        price: 890,
        original_price: None,
        image: "https://images.unsplash.com/photo-1549931319-a545dcf3bc73?w=400&h=300&fit=crop",
        category: "acompanhamentos",
        is_highlight: false,
        extras: &[],
    },
    SeedProduct {
        name: "Pudim de Leite Condensado",
        description: "Pudim caseiro cremoso feito com leite condensado e calda de açúcar.",
        price: 890,
        original_price: None,
        image: "https://images.unsplash.com/photo-1551024601-bec78aea704b?w=400&h=300&fit=crop",
        category: "sobremesas",
        is_highlight: true,
        extras: &[],
    },
    SeedProduct {
        name: "Brigadeiro Gourmet",
        description: "Brigadeiros artesanais com chocolate belga, granulado especial.",
        price: 350,
        original_price: None,
        image: "https://images.unsplash.com/photo-1488477181946-6428a0291777?w=400&h=300&fit=crop",
        category: "sobremesas",
        is_highlight: false,
        extras: &[],
    },
    SeedProduct {
        name: "Mousse de Maracujá",
        description: "Mousse cremoso de maracujá com polpa natural da fruta.",
        price: 790,
        original_price: None,
        image: "https://images.unsplash.com/photo-1541599468348-e96984315921?w=400&h=300&fit=crop",
        category: "sobremesas",
        is_highlight: false,
        extras: &[],
    },
    SeedProduct {
        name: "Refrigerante Lata",
        description: "Coca-Cola, Guaraná, Fanta Laranja ou Fanta Uva gelados.",
        price: 450,
        original_price: None,
        image: "https://images.unsplash.com/photo-1581006852262-e4307cf6283a?w=400&h=300&fit=crop",
        category: "bebidas",
        is_highlight: false,
        extras: &[],
    },
    SeedProduct {
        name: "Suco Natural",
        description: "Sucos naturais de laranja, limão, maracujá ou acerola.",
        price: 690,
        original_price: None,
        image: "https://images.unsplash.com/photo-1622597467836-f3285f2131b8?w=400&h=300&fit=crop",
        category: "bebidas",
        is_highlight: false,
        extras: &[],
    },
    SeedProduct {
        name: "Água Mineral",
        description: "Água mineral gelada 500ml.",
        price: 300,
        original_price: None,
        image: "https://images.unsplash.com/photo-1548839140-29a749e1cf4d?w=400&h=300&fit=crop",
        category: "bebidas",
        is_highlight: false,
        extras: &[],
    },
];

// (name, fee, estimated minutes)
const ZONES: &[(&str, i64, i32)] = &[
    ("Centro", 500, 30),
    ("Zona Norte", 800, 40),
    ("Zona Sul", 800, 40),
    ("Zona Rural", 1500, 60),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&pool).await?;

    let admin_id = ensure_user(&pool, "admin@example.com", "admin123", "Administrador").await?;
    role_service::grant(&orm, admin_id, role_service::ADMIN_ROLE).await?;
    println!("Ensured admin@example.com (role=admin)");

    let user_id = ensure_user(&pool, "cliente@example.com", "cliente123", "Cliente Teste").await?;
    println!("Ensured cliente@example.com");

    seed_catalog(&pool).await?;
    seed_zones(&pool).await?;
    seed_coupons(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &DbPool,
    email: &str,
    password: &str,
    full_name: &str,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .fetch_optional(pool)
    .await?;

    // If user already exists, fetch id
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    sqlx::query(
        r#"
        INSERT INTO profiles (id, full_name)
        VALUES ($1, $2)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(full_name)
    .execute(pool)
    .await?;

    Ok(user_id)
}

async fn seed_catalog(pool: &DbPool) -> anyhow::Result<()> {
    for product in CATALOG {
        let inserted: Option<(Uuid,)> = sqlx::query_as(
            r#"
            INSERT INTO products (id, name, description, price, original_price, image, category, is_highlight)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (name) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(product.name)
        .bind(product.description)
        .bind(product.price)
        .bind(product.original_price)
        .bind(product.image)
        .bind(product.category)
        .bind(product.is_highlight)
        .fetch_optional(pool)
        .await?;

        // Existing products keep their extras.
        let Some((product_id,)) = inserted else {
            continue;
        };
        for (name, price) in product.extras {
            sqlx::query(
                "INSERT INTO product_extras (id, product_id, name, price) VALUES ($1, $2, $3, $4)",
            )
            .bind(Uuid::new_v4())
            .bind(product_id)
            .bind(*name)
            .bind(*price)
            .execute(pool)
            .await?;
        }
    }

    println!("Seeded {} products", CATALOG.len());
    Ok(())
}

async fn seed_zones(pool: &DbPool) -> anyhow::Result<()> {
    for (name, fee, estimated_time) in ZONES {
        sqlx::query(
            r#"
            INSERT INTO delivery_zones (id, name, fee, estimated_time)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(*name)
        .bind(*fee)
        .bind(*estimated_time)
        .execute(pool)
        .await?;
    }

    println!("Seeded delivery zones");
    Ok(())
}

async fn seed_coupons(pool: &DbPool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO coupons (id, code, description, discount_type, discount_value, min_order_value)
        VALUES ($1, 'BEMVINDO10', '10% off the first order', 'percentage', 10, 3000)
        ON CONFLICT (code) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .execute(pool)
    .await?;

    println!("Seeded coupons");
    Ok(())
}
