use gormgen::prelude::*;
use pretty_assertions::assert_eq;

const ORDER_DDL: &str = "CREATE TABLE t_order (
    id BIGINT NOT NULL AUTO_INCREMENT,
    user_id BIGINT NOT NULL,
    remark VARCHAR(255),
    PRIMARY KEY (id)
);";

fn order_options() -> Options {
    Options {
        table_prefix: vec!["t_".to_string()],
        json_tag: true,
        ..Options::default()
    }
}

#[test]
fn test_end_to_end_order() {
    let code = translate(ORDER_DDL, &order_options()).expect("translate failed");
    let expected = "package model

import \"database/sql\"

type Order struct {
\tID     int64          `gorm:\"column:id;primary_key;AUTO_INCREMENT\" json:\"id\"`
\tUserID int64          `gorm:\"column:user_id;NOT NULL\" json:\"user_id\"`
\tRemark sql.NullString `gorm:\"column:remark\" json:\"remark\"`
}

func (m *Order) TableName() string {
\treturn \"t_order\"
}
";
    assert_eq!(code, expected);
}

#[test]
fn test_idempotent() {
    let opts = order_options();
    assert_eq!(
        translate(ORDER_DDL, &opts).unwrap(),
        translate(ORDER_DDL, &opts).unwrap()
    );
}

#[test]
fn test_column_order_preserved() {
    let sql = "CREATE TABLE z (zeta INT, alpha INT, mid INT, beta INT)";
    let code = generate(sql, &Options::default()).unwrap();
    let block = &code.structs[0];
    let positions: Vec<usize> = ["Zeta ", "Alpha ", "Mid ", "Beta "]
        .iter()
        .map(|f| block.find(f).expect("field missing"))
        .collect();
    let mut sorted = positions.clone();
    sorted.sort();
    assert_eq!(positions, sorted);
}

#[test]
fn test_nullability_styles() {
    let sql = "CREATE TABLE n (id INT NOT NULL, note VARCHAR(20), at DATETIME NULL)";

    let ptr = Options {
        null_style: NullStyle::Pointer,
        ..Options::default()
    };
    let code = translate(sql, &ptr).unwrap();
    assert!(code.contains("\tNote *string "));
    assert!(code.contains("\tAt   *time.Time "));
    assert!(code.contains("import \"time\""));

    let plain = Options {
        no_null_type: true,
        null_style: NullStyle::Pointer,
        ..Options::default()
    };
    let code = translate(sql, &plain).unwrap();
    assert!(code.contains("\tNote string "));
    assert!(code.contains("\tAt   time.Time "));
}

#[test]
fn test_prefix_only_on_word_boundary() {
    let opts = Options {
        table_prefix: vec!["t_".to_string()],
        ..Options::default()
    };
    let code = translate("CREATE TABLE t_user (id INT); CREATE TABLE tuser (id INT)", &opts).unwrap();
    assert!(code.contains("type User struct"));
    assert!(code.contains("type Tuser struct"));
    assert!(code.contains("func (m *User) TableName() string {\n\treturn \"t_user\""));
    assert!(code.contains("func (m *Tuser) TableName() string {\n\treturn \"tuser\""));
}

#[test]
fn test_collision_produces_no_output() {
    let sql = "CREATE TABLE u (user_name VARCHAR(10), userName VARCHAR(10))";
    let mut out: Vec<u8> = Vec::new();
    let err = translate_to_writer(sql, &Options::default(), &mut out).unwrap_err();
    match err {
        GenError::NamingCollision { first, second, name, .. } => {
            assert_eq!(first, "user_name");
            assert_eq!(second, "userName");
            assert_eq!(name, "UserName");
        }
        other => panic!("expected collision, got {other:?}"),
    }
    assert!(out.is_empty());
}

#[test]
fn test_unsupported_type_names_column() {
    let err = translate("CREATE TABLE g (pos POINT NOT NULL)", &Options::default()).unwrap_err();
    assert_eq!(err.kind(), "UNSUPPORTED_TYPE");
    assert_eq!(err.to_string(), "Unsupported type `point` for column `g`.`pos`");
}

#[test]
fn test_mysqldump_batch() {
    let sql = r#"
-- MySQL dump
/*!40101 SET NAMES utf8mb4 */;
DROP TABLE IF EXISTS `t_user`;
CREATE TABLE `t_user` (
  `id` int(10) unsigned NOT NULL AUTO_INCREMENT,
  `avatar_url` varchar(255) NOT NULL DEFAULT '' COMMENT 'profile picture',
  `balance` decimal(12,2) DEFAULT NULL,
  `raw` blob,
  `created_at` datetime NOT NULL DEFAULT CURRENT_TIMESTAMP,
  PRIMARY KEY (`id`),
  KEY `idx_created` (`created_at`)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COMMENT='accounts';
CREATE TABLE `t_login` (
  `id` bigint NOT NULL,
  `user_id` int unsigned NOT NULL,
  `ip` varchar(45) DEFAULT NULL,
  PRIMARY KEY (`id`),
  CONSTRAINT `fk_login_user` FOREIGN KEY (`user_id`) REFERENCES `t_user` (`id`)
) ENGINE=InnoDB;
"#;
    let opts = Options {
        table_prefix: vec!["t_".to_string()],
        package: Some("entity".to_string()),
        ..Options::default()
    };
    let code = generate(sql, &opts).unwrap();
    assert_eq!(code.package, "entity");
    assert_eq!(
        code.imports.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["database/sql", "time"]
    );
    assert_eq!(code.structs.len(), 2);

    let user = &code.structs[0];
    assert!(user.starts_with("// accounts\ntype User struct {\n"));
    assert!(user.contains("AvatarURL string "));
    assert!(user.contains("default:'';NOT NULL\"` // profile picture"));
    assert!(user.contains("Balance   sql.NullString "));
    assert!(user.contains("Raw       []byte "));
    assert!(user.contains("gorm:\"column:created_at;default:CURRENT_TIMESTAMP;index:idx_created;NOT NULL\""));

    let login = &code.structs[1];
    assert!(login.contains("UserID uint32 "));
    assert!(login.contains("IP     sql.NullString "));

    let text = code.to_string();
    assert!(text.starts_with("package entity\n\nimport (\n\t\"database/sql\"\n\t\"time\"\n)\n"));
    assert_eq!(text.matches("package ").count(), 1);
}

#[test]
fn test_syntax_error_fails_batch() {
    let sql = "CREATE TABLE a (id INT);\nCREATE TABLE b (id INT,,);";
    match translate(sql, &Options::default()).unwrap_err() {
        GenError::Syntax { line, .. } => assert_eq!(line, 2),
        other => panic!("expected syntax error, got {other:?}"),
    }
}

#[test]
fn test_default_values_stay_inside_tag() {
    let sql = "CREATE TABLE notes (x VARCHAR(20) NOT NULL DEFAULT 'a;b', y VARCHAR(20) DEFAULT 'line1
line2')";
    let code = translate(sql, &Options::default()).unwrap();
    assert!(code.contains(r#"gorm:"column:x;default:a\\;b;NOT NULL""#));
    assert!(code.contains(r#"gorm:"column:y;default:line1\nline2""#));
    assert!(!code.contains("line1\nline2"));
}
