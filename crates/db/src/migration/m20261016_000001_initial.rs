//! Initial database migration.
//!
//! Creates cafés, customers, dining tables, menu items, orders, order items
//! and payments, plus `updated_at` triggers and tenant RLS policies.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: TENANTS
        // ============================================================
        db.execute_unprepared(CAFES_SQL).await?;

        // ============================================================
        // PART 2: FLOOR & MENU
        // ============================================================
        db.execute_unprepared(CUSTOMERS_SQL).await?;
        db.execute_unprepared(DINING_TABLES_SQL).await?;
        db.execute_unprepared(MENU_ITEMS_SQL).await?;

        // ============================================================
        // PART 3: ORDERS & PAYMENTS
        // ============================================================
        db.execute_unprepared(ORDERS_SQL).await?;
        db.execute_unprepared(ORDER_ITEMS_SQL).await?;
        db.execute_unprepared(PAYMENTS_SQL).await?;

        // ============================================================
        // PART 4: TRIGGERS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        // ============================================================
        // PART 5: ROW-LEVEL SECURITY
        // ============================================================
        db.execute_unprepared(RLS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const CAFES_SQL: &str = r"
CREATE TABLE cafes (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    subdomain VARCHAR(63) NOT NULL UNIQUE,
    active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_subdomain_format CHECK (subdomain ~ '^[a-z0-9][a-z0-9-]*$')
);
";

const CUSTOMERS_SQL: &str = r"
CREATE TABLE customers (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    cafe_id UUID NOT NULL REFERENCES cafes(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    phone VARCHAR(32) NOT NULL DEFAULT '',
    credit_balance NUMERIC(12, 2) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_credit_balance_non_negative CHECK (credit_balance >= 0)
);

-- Phone is unique per café when present
CREATE UNIQUE INDEX idx_customers_cafe_phone ON customers(cafe_id, phone) WHERE phone <> '';
CREATE INDEX idx_customers_cafe_name ON customers(cafe_id, name);
";

const DINING_TABLES_SQL: &str = r"
CREATE TABLE dining_tables (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    cafe_id UUID NOT NULL REFERENCES cafes(id) ON DELETE CASCADE,
    name VARCHAR(100) NOT NULL,
    position_x INTEGER NOT NULL DEFAULT 0,
    position_y INTEGER NOT NULL DEFAULT 0,
    width INTEGER NOT NULL DEFAULT 100,
    height INTEGER NOT NULL DEFAULT 100,
    status VARCHAR(16) NOT NULL DEFAULT 'free',
    customer_id UUID REFERENCES customers(id) ON DELETE SET NULL,
    guest_name VARCHAR(255) NOT NULL DEFAULT '',
    guest_phone VARCHAR(32) NOT NULL DEFAULT '',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_table_status CHECK (status IN ('free', 'occupied', 'reserved')),
    CONSTRAINT chk_free_table_unassigned CHECK (
        status <> 'free' OR (customer_id IS NULL AND guest_name = '' AND guest_phone = '')
    )
);

CREATE INDEX idx_dining_tables_cafe ON dining_tables(cafe_id, name);
";

const MENU_ITEMS_SQL: &str = r"
CREATE TABLE menu_items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    cafe_id UUID NOT NULL REFERENCES cafes(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    category VARCHAR(100) NOT NULL DEFAULT '',
    price NUMERIC(12, 2) NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    available BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_menu_price_non_negative CHECK (price >= 0)
);

CREATE INDEX idx_menu_items_cafe_category ON menu_items(cafe_id, category, name);
";

const ORDERS_SQL: &str = r"
CREATE TABLE orders (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    cafe_id UUID NOT NULL REFERENCES cafes(id) ON DELETE CASCADE,
    table_id UUID NOT NULL REFERENCES dining_tables(id) ON DELETE NO ACTION,
    customer_id UUID REFERENCES customers(id) ON DELETE SET NULL,
    status VARCHAR(16) NOT NULL DEFAULT 'pending',
    total NUMERIC(12, 2) NOT NULL DEFAULT 0,
    notes TEXT NOT NULL DEFAULT '',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_order_status CHECK (status IN ('pending', 'served', 'billed')),
    CONSTRAINT chk_order_total_non_negative CHECK (total >= 0)
);

-- Payout reads unbilled orders per table
CREATE INDEX idx_orders_table_unbilled ON orders(table_id) WHERE status <> 'billed';
CREATE INDEX idx_orders_cafe_created ON orders(cafe_id, created_at DESC);
CREATE INDEX idx_orders_customer ON orders(customer_id) WHERE customer_id IS NOT NULL;
";

const ORDER_ITEMS_SQL: &str = r"
CREATE TABLE order_items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    cafe_id UUID NOT NULL REFERENCES cafes(id) ON DELETE CASCADE,
    order_id UUID NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
    item_name VARCHAR(255) NOT NULL,
    quantity INTEGER NOT NULL DEFAULT 1,
    price NUMERIC(12, 2) NOT NULL,
    subtotal NUMERIC(12, 2) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_item_quantity_positive CHECK (quantity > 0),
    CONSTRAINT chk_item_price_non_negative CHECK (price >= 0),
    CONSTRAINT chk_item_subtotal CHECK (subtotal = quantity * price)
);

CREATE INDEX idx_order_items_order ON order_items(order_id, created_at);
";

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    cafe_id UUID NOT NULL REFERENCES cafes(id) ON DELETE CASCADE,
    customer_id UUID NOT NULL REFERENCES customers(id) ON DELETE NO ACTION,
    order_id UUID REFERENCES orders(id) ON DELETE SET NULL,
    amount NUMERIC(12, 2) NOT NULL,
    method VARCHAR(32) NOT NULL DEFAULT 'cash',
    notes TEXT NOT NULL DEFAULT '',
    -- Signed change this payment made to the customer balance
    balance_delta NUMERIC(12, 2) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_payment_amount_positive CHECK (amount > 0)
);

CREATE INDEX idx_payments_cafe_created ON payments(cafe_id, created_at DESC);
CREATE INDEX idx_payments_customer ON payments(customer_id, created_at DESC);
CREATE INDEX idx_payments_order ON payments(order_id) WHERE order_id IS NOT NULL;
";

const TRIGGERS_SQL: &str = r"
CREATE OR REPLACE FUNCTION set_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_cafes_updated_at BEFORE UPDATE ON cafes
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_customers_updated_at BEFORE UPDATE ON customers
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_dining_tables_updated_at BEFORE UPDATE ON dining_tables
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_menu_items_updated_at BEFORE UPDATE ON menu_items
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_orders_updated_at BEFORE UPDATE ON orders
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

-- Billed orders are frozen
CREATE OR REPLACE FUNCTION prevent_billed_order_reopen()
RETURNS TRIGGER AS $$
BEGIN
    IF OLD.status = 'billed' AND NEW.status <> 'billed' THEN
        RAISE EXCEPTION 'Cannot reopen billed order %', OLD.id;
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_billed_reopen BEFORE UPDATE ON orders
    FOR EACH ROW EXECUTE FUNCTION prevent_billed_order_reopen();
";

const RLS_SQL: &str = r"
-- ============================================================
-- ROW-LEVEL SECURITY POLICIES
-- The application runs tenant work inside a transaction that sets
--   SET LOCAL app.current_cafe_id = '<cafe uuid>';
-- ============================================================

ALTER TABLE customers ENABLE ROW LEVEL SECURITY;
ALTER TABLE dining_tables ENABLE ROW LEVEL SECURITY;
ALTER TABLE menu_items ENABLE ROW LEVEL SECURITY;
ALTER TABLE orders ENABLE ROW LEVEL SECURITY;
ALTER TABLE order_items ENABLE ROW LEVEL SECURITY;
ALTER TABLE payments ENABLE ROW LEVEL SECURITY;

CREATE POLICY tenant_isolation ON customers
    USING (cafe_id = NULLIF(current_setting('app.current_cafe_id', true), '')::UUID)
    WITH CHECK (cafe_id = NULLIF(current_setting('app.current_cafe_id', true), '')::UUID);

CREATE POLICY tenant_isolation ON dining_tables
    USING (cafe_id = NULLIF(current_setting('app.current_cafe_id', true), '')::UUID)
    WITH CHECK (cafe_id = NULLIF(current_setting('app.current_cafe_id', true), '')::UUID);

CREATE POLICY tenant_isolation ON menu_items
    USING (cafe_id = NULLIF(current_setting('app.current_cafe_id', true), '')::UUID)
    WITH CHECK (cafe_id = NULLIF(current_setting('app.current_cafe_id', true), '')::UUID);

CREATE POLICY tenant_isolation ON orders
    USING (cafe_id = NULLIF(current_setting('app.current_cafe_id', true), '')::UUID)
    WITH CHECK (cafe_id = NULLIF(current_setting('app.current_cafe_id', true), '')::UUID);

CREATE POLICY tenant_isolation ON order_items
    USING (cafe_id = NULLIF(current_setting('app.current_cafe_id', true), '')::UUID)
    WITH CHECK (cafe_id = NULLIF(current_setting('app.current_cafe_id', true), '')::UUID);

CREATE POLICY tenant_isolation ON payments
    USING (cafe_id = NULLIF(current_setting('app.current_cafe_id', true), '')::UUID)
    WITH CHECK (cafe_id = NULLIF(current_setting('app.current_cafe_id', true), '')::UUID);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS payments CASCADE;
DROP TABLE IF EXISTS order_items CASCADE;
DROP TABLE IF EXISTS orders CASCADE;
DROP TABLE IF EXISTS menu_items CASCADE;
DROP TABLE IF EXISTS dining_tables CASCADE;
DROP TABLE IF EXISTS customers CASCADE;
DROP TABLE IF EXISTS cafes CASCADE;
DROP FUNCTION IF EXISTS set_updated_at() CASCADE;
DROP FUNCTION IF EXISTS prevent_billed_order_reopen() CASCADE;
";
