//! Catalog seeding command.
//!
//! Loads the 30-product pet-supply catalog. A product whose name already
//! exists in the database is skipped, so the command can be re-run safely.

use rust_decimal::Decimal;
use tracing::{info, warn};

use huellitas_web::config::AppConfig;
use huellitas_web::db::{self, ProductRepository};
use huellitas_web::models::ProductInput;

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    /// Price in cents; converted with `Decimal::new(cents, 2)`.
    price_cents: i64,
    stock_quantity: i32,
}

const CATALOG: &[SeedProduct] = &[
    SeedProduct {
        name: "Concentrado premium para perros",
        description: "Alimento seco de alta calidad para perros adultos de todas las razas, con vitaminas y minerales esenciales.",
        price_cents: 7_500_000,
        stock_quantity: 150,
    },
    SeedProduct {
        name: "Juguete interactivo para gatos",
        description: "Ratón de felpa con catnip para estimular el instinto de caza y juego en gatos.",
        price_cents: 1_550_000,
        stock_quantity: 200,
    },
    SeedProduct {
        name: "Jeringa de 35 ml",
        description: "Jeringa desechable de 35 ml con aguja, para administración de medicamentos o fluidos.",
        price_cents: 450_000,
        stock_quantity: 300,
    },
    SeedProduct {
        name: "Shampoo antipulgas para perros",
        description: "Shampoo medicinal con efecto rápido contra pulgas y garrapatas, deja el pelaje suave y brillante.",
        price_cents: 3_200_000,
        stock_quantity: 80,
    },
    SeedProduct {
        name: "Collar isabelino talla M",
        description: "Collar de protección para evitar que el animal se lama o muerda heridas y vendajes.",
        price_cents: 2_800_000,
        stock_quantity: 50,
    },
    SeedProduct {
        name: "Snacks dentales para perros",
        description: "Galletas masticables que ayudan a reducir la placa y el sarro, manteniendo los dientes limpios.",
        price_cents: 2_250_000,
        stock_quantity: 120,
    },
    SeedProduct {
        name: "Cepillo para pelo de gato",
        description: "Cepillo de cerdas suaves para eliminar el exceso de pelo y evitar la formación de bolas de pelo.",
        price_cents: 1_800_000,
        stock_quantity: 95,
    },
    SeedProduct {
        name: "Cama ortopédica para perros grandes",
        description: "Cama con espuma de memoria para aliviar la presión en las articulaciones de perros mayores o con artritis.",
        price_cents: 12_000_000,
        stock_quantity: 25,
    },
    SeedProduct {
        name: "Transportadora para gatos",
        description: "Transportadora plástica y ventilada, ideal para viajes cortos o visitas al veterinario.",
        price_cents: 6_500_000,
        stock_quantity: 40,
    },
    SeedProduct {
        name: "Suplemento de omega-3",
        description: "Gotas de aceite de pescado para mejorar la salud de la piel y el pelaje de perros y gatos.",
        price_cents: 4_800_000,
        stock_quantity: 70,
    },
    SeedProduct {
        name: "Antibiótico de amplio espectro",
        description: "Medicamento en pastillas para tratar infecciones bacterianas comunes en mascotas.",
        price_cents: 6_500_000,
        stock_quantity: 35,
    },
    SeedProduct {
        name: "Guantes de látex desechables",
        description: "Caja de 100 guantes para procedimientos veterinarios y manipulación de productos.",
        price_cents: 1_850_000,
        stock_quantity: 150,
    },
    SeedProduct {
        name: "Comida húmeda para cachorros",
        description: "Paté nutritivo con pollo y arroz para cachorros en crecimiento.",
        price_cents: 1_200_000,
        stock_quantity: 180,
    },
    SeedProduct {
        name: "Arenero autolimpiable",
        description: "Caja de arena automática para gatos que simplifica la limpieza diaria.",
        price_cents: 25_000_000,
        stock_quantity: 15,
    },
    SeedProduct {
        name: "Champú hipoalergénico",
        description: "Producto para pieles sensibles, libre de fragancias y colorantes que pueden causar irritación.",
        price_cents: 4_500_000,
        stock_quantity: 60,
    },
    SeedProduct {
        name: "Juguete dispensador de comida",
        description: "Bola de goma con un orificio para guardar snacks, que fomenta la actividad física y mental.",
        price_cents: 2_100_000,
        stock_quantity: 110,
    },
    SeedProduct {
        name: "Gotas para los oídos",
        description: "Solución ótica para limpiar y prevenir infecciones en los oídos de perros.",
        price_cents: 3_800_000,
        stock_quantity: 45,
    },
    SeedProduct {
        name: "Plato doble de acero inoxidable",
        description: "Comedero y bebedero resistente y fácil de limpiar para mascotas.",
        price_cents: 2_900_000,
        stock_quantity: 90,
    },
    SeedProduct {
        name: "Bolsas sanitarias para perros",
        description: "Rollos de bolsas biodegradables para recoger los desechos de las mascotas.",
        price_cents: 950_000,
        stock_quantity: 250,
    },
    SeedProduct {
        name: "Venda elástica autoadherente",
        description: "Venda flexible para curar lesiones, que no se pega al pelo de los animales.",
        price_cents: 1_400_000,
        stock_quantity: 100,
    },
    SeedProduct {
        name: "Spray repelente de insectos",
        description: "Producto para rociar en el pelaje que protege contra mosquitos y otros insectos.",
        price_cents: 3_750_000,
        stock_quantity: 75,
    },
    SeedProduct {
        name: "Termómetro digital veterinario",
        description: "Termómetro de uso rectal con punta flexible para una medición rápida y precisa de la temperatura.",
        price_cents: 5_500_000,
        stock_quantity: 30,
    },
    SeedProduct {
        name: "Cortaúñas para mascotas",
        description: "Cortaúñas de acero inoxidable con mango antideslizante, ideal para el cuidado de las uñas.",
        price_cents: 2_600_000,
        stock_quantity: 85,
    },
    SeedProduct {
        name: "Jaula plegable para perros",
        description: "Jaula de metal segura y fácil de armar, perfecta para entrenamientos y viajes.",
        price_cents: 11_000_000,
        stock_quantity: 20,
    },
    SeedProduct {
        name: "Pezón de silicona para biberones",
        description: "Pezones de repuesto para alimentar cachorros y gatitos huérfanos.",
        price_cents: 850_000,
        stock_quantity: 150,
    },
    SeedProduct {
        name: "Limpiador de lágrimas para perros",
        description: "Solución suave para eliminar manchas de lágrimas alrededor de los ojos de perros de razas pequeñas.",
        price_cents: 1_950_000,
        stock_quantity: 65,
    },
    SeedProduct {
        name: "Concentrado para gatos esterilizados",
        description: "Alimento especializado para controlar el peso y la salud urinaria en gatos castrados.",
        price_cents: 7_800_000,
        stock_quantity: 90,
    },
    SeedProduct {
        name: "Cepillo de dientes de dedo",
        description: "Cepillo pequeño y flexible para una limpieza dental suave en perros y gatos.",
        price_cents: 1_150_000,
        stock_quantity: 130,
    },
    SeedProduct {
        name: "Correa retráctil para perros",
        description: "Correa extensible de 5 metros para paseos seguros y con libertad de movimiento.",
        price_cents: 4_200_000,
        stock_quantity: 55,
    },
    SeedProduct {
        name: "Kit de primeros auxilios para mascotas",
        description: "Maletín con vendajes, gasas, antiséptico y otros elementos esenciales para emergencias.",
        price_cents: 8_500_000,
        stock_quantity: 25,
    },
];

/// Load the catalog into the database.
///
/// # Errors
///
/// Returns an error if configuration is missing or a database operation
/// fails.
pub async fn products() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;
    let repo = ProductRepository::new(&pool);

    info!("Starting catalog load");

    let mut created = 0usize;
    let mut existing = 0usize;

    for seed in CATALOG {
        if repo.exists_by_name(seed.name).await? {
            existing += 1;
            warn!(product = seed.name, "already exists, skipping");
            continue;
        }

        repo.create(ProductInput {
            name: seed.name.to_owned(),
            description: seed.description.to_owned(),
            price: Decimal::new(seed.price_cents, 2),
            stock_quantity: seed.stock_quantity,
        })
        .await?;
        created += 1;
        info!(product = seed.name, "created");
    }

    info!("Catalog load summary");
    info!("  Products created: {created}");
    info!("  Products already existing: {existing}");
    info!("  Total processed: {}", CATALOG.len());

    if created > 0 {
        info!("{created} products loaded successfully");
    } else {
        warn!("No new products created; the whole catalog already existed");
    }

    Ok(())
}
